/// Description of a location with weather files.
///
/// Two locations describe the same real-world station iff their city, province,
/// country, and code all match. Coordinates and elevation are expected to agree
/// between files for the same station but are not part of that identity.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub city: String,
    pub province: String,
    pub country: String,
    pub code: String,
    pub longitude: f64,
    pub latitude: f64,
    pub elevation: Option<f64>,
}

impl Location {
    /// Return true if the other location refers to the same real-world station.
    pub fn same_station(&self, other: &Location) -> bool {
        self.city == other.city
            && self.province == other.province
            && self.country == other.country
            && self.code == other.code
    }
}

/// A location paired with its catalog row id.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRecord {
    pub id: i64,
    pub location: Location,
}
