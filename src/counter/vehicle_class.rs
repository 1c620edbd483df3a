//! Vehicle categories and the class-id lookup used to label detections.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Closed set of vehicle categories counted per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleClass {
    Car,
    Motorcycle,
    Bus,
    Truck,
    /// Any class id the resolver does not recognise.
    Unknown,
}

impl VehicleClass {
    /// Number of categories, including `Unknown`.
    pub const COUNT: usize = 5;

    /// All categories in tally column order.
    pub const ALL: [VehicleClass; Self::COUNT] = [
        VehicleClass::Car,
        VehicleClass::Motorcycle,
        VehicleClass::Bus,
        VehicleClass::Truck,
        VehicleClass::Unknown,
    ];

    /// Column index of this class in a tally.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            VehicleClass::Car => 0,
            VehicleClass::Motorcycle => 1,
            VehicleClass::Bus => 2,
            VehicleClass::Truck => 3,
            VehicleClass::Unknown => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VehicleClass::Car => "car",
            VehicleClass::Motorcycle => "motorcycle",
            VehicleClass::Bus => "bus",
            VehicleClass::Truck => "truck",
            VehicleClass::Unknown => "unknown",
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolves a detector class id into a vehicle category.
///
/// Implement this for detectors whose label space differs from COCO.
pub trait ClassResolver {
    fn resolve(&self, class_id: i64) -> VehicleClass;
}

/// Table-driven class resolver. Ids missing from the table resolve to
/// [`VehicleClass::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMap {
    ids: HashMap<i64, VehicleClass>,
}

impl ClassMap {
    /// An empty map: every id resolves to `Unknown`.
    pub fn empty() -> Self {
        Self {
            ids: HashMap::new(),
        }
    }

    /// COCO-80 ids for the four vehicle categories.
    pub fn coco() -> Self {
        let mut map = Self::empty();
        map.insert(2, VehicleClass::Car);
        map.insert(3, VehicleClass::Motorcycle);
        map.insert(5, VehicleClass::Bus);
        map.insert(7, VehicleClass::Truck);
        map
    }

    /// Map `class_id` to `class`, returning the class it was previously mapped to.
    pub fn insert(&mut self, class_id: i64, class: VehicleClass) -> Option<VehicleClass> {
        self.ids.insert(class_id, class)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for ClassMap {
    fn default() -> Self {
        Self::coco()
    }
}

impl ClassResolver for ClassMap {
    fn resolve(&self, class_id: i64) -> VehicleClass {
        self.ids
            .get(&class_id)
            .copied()
            .unwrap_or(VehicleClass::Unknown)
    }
}
