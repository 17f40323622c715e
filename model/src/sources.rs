use anyhow::Result;
use serde::Deserialize;

use crate::records::RawRouteEntry;

/// Reads one source table of route rows. All-or-nothing: any malformed row
/// fails the whole source, so a caller never sees a partial table.
///
/// The sheets use merged cells for fleets: only the first row of a group
/// carries the airline, registration, aircraft, and age, and the rows below
/// it leave those cells blank. Blank-airline rows therefore continue the
/// previous group. A blank-airline row with no group to continue is kept
/// with an empty airline; the builder counts and skips it.
pub fn load_table<R: std::io::Read>(reader: R) -> Result<Vec<RawRouteEntry>> {
    let mut entries: Vec<RawRouteEntry> = Vec::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        let airline = clean_cell(rec.airline);
        let registration = clean_cell(rec.registration);
        let aircraft = clean_cell(rec.aircraft);
        let age = clean_cell(rec.age);

        let mut entry = RawRouteEntry {
            airline: airline.unwrap_or_default(),
            registration,
            aircraft,
            age,
            export_routes: clean_cell(rec.export_routes),
            import_routes: clean_cell(rec.import_routes),
            remarks: clean_cell(rec.remarks),
        };
        if entry.airline.is_empty() {
            if let Some(prev) = entries.last() {
                entry.airline = prev.airline.clone();
                if entry.registration.is_none() {
                    entry.registration = prev.registration.clone();
                }
                if entry.aircraft.is_none() {
                    entry.aircraft = prev.aircraft.clone();
                }
                if entry.age.is_none() {
                    entry.age = prev.age.clone();
                }
            }
        }
        entries.push(entry);
    }
    Ok(entries)
}

/// Collapses the sheets' assorted missing-value spellings to None, once,
/// here. Downstream code only ever checks for None.
fn clean_cell(cell: Option<String>) -> Option<String> {
    let cell = cell?;
    let cell = cell.trim();
    if cell.is_empty() || matches!(cell, "nan" | "NaN" | "None" | "null") {
        return None;
    }
    Some(cell.to_string())
}

#[derive(Deserialize)]
struct Record {
    #[serde(rename = "航司")]
    airline: Option<String>,
    #[serde(rename = "注册号")]
    registration: Option<String>,
    #[serde(rename = "机型")]
    aircraft: Option<String>,
    #[serde(rename = "机龄")]
    age: Option<String>,
    #[serde(rename = "出口航线")]
    export_routes: Option<String>,
    #[serde(rename = "进口航线")]
    import_routes: Option<String>,
    #[serde(rename = "备注")]
    remarks: Option<String>,
}
