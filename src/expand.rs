use std::collections::HashSet;

use crate::error::OptimizeError;
use crate::types::{RakeTemplate, Wagon};

pub fn expand(template: &RakeTemplate) -> Result<Vec<Wagon>, OptimizeError> {
    validate(template)?;
    let params = &template.wagon_params;
    let wagons = (1..=template.num_wagons)
        .map(|i| Wagon {
            id: format!("{}_{}", template.id, i),
            payload_limit_t: params.payload_limit_t,
            length_m: params.length_m,
            width_m: params.width_m,
            height_m: params.height_m,
            slots: params.slots.clone(),
        })
        .collect();
    Ok(wagons)
}

fn validate(template: &RakeTemplate) -> Result<(), OptimizeError> {
    if template.num_wagons < 1 {
        return Err(invalid(template, "num_wagons must be at least 1"));
    }

    let params = &template.wagon_params;
    let wagon_fields = [
        ("payload_limit_t", params.payload_limit_t),
        ("length_m", params.length_m),
        ("width_m", params.width_m),
        ("height_m", params.height_m),
    ];
    for (field, value) in wagon_fields {
        if !positive(value) {
            return Err(invalid(
                template,
                &format!("wagon {field} must be positive, got {value}"),
            ));
        }
    }

    let mut seen = HashSet::new();
    for slot in &params.slots {
        let slot_fields = [
            ("max_weight_t", slot.max_weight_t),
            ("max_length_m", slot.max_length_m),
            ("max_width_m", slot.max_width_m),
            ("max_height_m", slot.max_height_m),
        ];
        for (field, value) in slot_fields {
            if !positive(value) {
                return Err(invalid(
                    template,
                    &format!("slot {} {field} must be positive, got {value}", slot.id),
                ));
            }
        }
        if !seen.insert(slot.id.as_str()) {
            return Err(invalid(
                template,
                &format!("duplicate slot id {}", slot.id),
            ));
        }
    }

    Ok(())
}

fn invalid(template: &RakeTemplate, reason: &str) -> OptimizeError {
    OptimizeError::InvalidTemplate(format!("{}: {reason}", template.id))
}

// Rejects NaN and infinities along with zero and negatives.
fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
