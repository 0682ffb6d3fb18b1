use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub category: String,
    pub weight_t: f64,
    pub length_m: f64,
    pub width_m: f64,
    pub height_m: f64,
}

impl Product {
    pub fn fits_in(&self, slot: &Slot) -> bool {
        self.length_m <= slot.max_length_m
            && self.width_m <= slot.max_width_m
            && self.height_m <= slot.max_height_m
    }
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:.1}t)", self.id, self.weight_t)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: String,
    pub max_weight_t: f64,
    pub max_length_m: f64,
    pub max_width_m: f64,
    pub max_height_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WagonParams {
    pub payload_limit_t: f64,
    pub length_m: f64,
    pub width_m: f64,
    pub height_m: f64,
    pub slots: Vec<Slot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RakeTemplate {
    pub id: String,
    pub wagon_type: String,
    pub num_wagons: u32,
    pub wagon_params: WagonParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wagon {
    pub id: String,
    pub payload_limit_t: f64,
    pub length_m: f64,
    pub width_m: f64,
    pub height_m: f64,
    pub slots: Vec<Slot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub product_id: String,
    pub wagon_id: String,
    pub slot_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    TimeLimited,
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::TimeLimited => write!(f, "time-limited feasible"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadPlan {
    pub wagons: Vec<Wagon>,
    pub assignments: Vec<Assignment>,
    pub unassigned_products: Vec<String>,
    pub total_loaded_t: f64,
    pub utilization_pct: f64,
    pub status: SolveStatus,
}

impl LoadPlan {
    pub fn wagon_count(&self) -> usize {
        self.wagons.len()
    }

    pub fn slot_count(&self) -> usize {
        self.wagons.iter().map(|w| w.slots.len()).sum()
    }

    pub fn total_capacity_t(&self) -> f64 {
        self.wagons.iter().map(|w| w.payload_limit_t).sum()
    }
}
