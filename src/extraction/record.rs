use serde::Serialize;

/// Every detail column, in on-disk order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    CityDistrict,
    FullAddress,
    Floor,
    TotalFloors,
    YearBuilt,
    BuildingType,
    PricePerSqmDetailed,
    DescriptionText,
    HasBasement,
    HasParking,
    KitchenType,
    WindowType,
    OwnershipType,
    Equipment,
    Latitude,
    Longitude,
}

impl Field {
    pub const ALL: [Field; 16] = [
        Field::CityDistrict,
        Field::FullAddress,
        Field::Floor,
        Field::TotalFloors,
        Field::YearBuilt,
        Field::BuildingType,
        Field::PricePerSqmDetailed,
        Field::DescriptionText,
        Field::HasBasement,
        Field::HasParking,
        Field::KitchenType,
        Field::WindowType,
        Field::OwnershipType,
        Field::Equipment,
        Field::Latitude,
        Field::Longitude,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            Field::CityDistrict => "city_district",
            Field::FullAddress => "full_address",
            Field::Floor => "floor",
            Field::TotalFloors => "total_floors",
            Field::YearBuilt => "year_built",
            Field::BuildingType => "building_type",
            Field::PricePerSqmDetailed => "price_per_sqm_detailed",
            Field::DescriptionText => "description_text",
            Field::HasBasement => "has_basement",
            Field::HasParking => "has_parking",
            Field::KitchenType => "kitchen_type",
            Field::WindowType => "window_type",
            Field::OwnershipType => "ownership_type",
            Field::Equipment => "equipment",
            Field::Latitude => "latitude",
            Field::Longitude => "longitude",
        }
    }
}

/// Detail fields of one listing page. Fields start empty and are write-once:
/// the first non-empty commit sticks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DetailsRecord {
    pub city_district: String,
    pub full_address: String,
    pub floor: String,
    pub total_floors: String,
    pub year_built: String,
    pub building_type: String,
    pub price_per_sqm_detailed: String,
    pub description_text: String,
    pub has_basement: String,
    pub has_parking: String,
    pub kitchen_type: String,
    pub window_type: String,
    pub ownership_type: String,
    pub equipment: String,
    pub latitude: String,
    pub longitude: String,
}

impl DetailsRecord {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::CityDistrict => &self.city_district,
            Field::FullAddress => &self.full_address,
            Field::Floor => &self.floor,
            Field::TotalFloors => &self.total_floors,
            Field::YearBuilt => &self.year_built,
            Field::BuildingType => &self.building_type,
            Field::PricePerSqmDetailed => &self.price_per_sqm_detailed,
            Field::DescriptionText => &self.description_text,
            Field::HasBasement => &self.has_basement,
            Field::HasParking => &self.has_parking,
            Field::KitchenType => &self.kitchen_type,
            Field::WindowType => &self.window_type,
            Field::OwnershipType => &self.ownership_type,
            Field::Equipment => &self.equipment,
            Field::Latitude => &self.latitude,
            Field::Longitude => &self.longitude,
        }
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::CityDistrict => &mut self.city_district,
            Field::FullAddress => &mut self.full_address,
            Field::Floor => &mut self.floor,
            Field::TotalFloors => &mut self.total_floors,
            Field::YearBuilt => &mut self.year_built,
            Field::BuildingType => &mut self.building_type,
            Field::PricePerSqmDetailed => &mut self.price_per_sqm_detailed,
            Field::DescriptionText => &mut self.description_text,
            Field::HasBasement => &mut self.has_basement,
            Field::HasParking => &mut self.has_parking,
            Field::KitchenType => &mut self.kitchen_type,
            Field::WindowType => &mut self.window_type,
            Field::OwnershipType => &mut self.ownership_type,
            Field::Equipment => &mut self.equipment,
            Field::Latitude => &mut self.latitude,
            Field::Longitude => &mut self.longitude,
        }
    }

    pub fn is_set(&self, field: Field) -> bool {
        !self.get(field).is_empty()
    }

    /// Store `value` unless the field is already set or `value` is empty.
    /// Returns whether the value was taken.
    pub fn commit(&mut self, field: Field, value: impl Into<String>) -> bool {
        let value = value.into();
        if value.is_empty() || self.is_set(field) { return false; }
        *self.slot(field) = value;
        true
    }

    pub fn resolved_count(&self) -> usize {
        Field::ALL.iter().filter(|f| self.is_set(**f)).count()
    }

    /// Values in column order.
    pub fn values(&self) -> impl Iterator<Item = &str> + '_ {
        Field::ALL.iter().map(move |f| self.get(*f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_is_write_once() {
        let mut rec = DetailsRecord::default();
        assert!(rec.commit(Field::Floor, "3"));
        assert!(!rec.commit(Field::Floor, "7"));
        assert_eq!(rec.floor, "3");
    }

    #[test]
    fn empty_commit_leaves_field_open() {
        let mut rec = DetailsRecord::default();
        assert!(!rec.commit(Field::YearBuilt, ""));
        assert!(rec.commit(Field::YearBuilt, "1998"));
        assert_eq!(rec.year_built, "1998");
    }

    #[test]
    fn sixteen_unique_columns() {
        let mut cols: Vec<&str> = Field::ALL.iter().map(|f| f.column()).collect();
        assert_eq!(cols.len(), 16);
        cols.sort();
        cols.dedup();
        assert_eq!(cols.len(), 16);
        assert_eq!(DetailsRecord::default().values().count(), 16);
    }
}
