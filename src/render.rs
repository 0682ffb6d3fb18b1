use std::collections::HashMap;

use crate::types::{LoadPlan, Product};

pub fn render_plan(plan: &LoadPlan, products: &[Product]) -> String {
    let by_id: HashMap<&str, &Product> = products.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut out = String::new();
    for wagon in &plan.wagons {
        out.push_str(&format!(
            "{} (payload {:.1}t)\n",
            wagon.id, wagon.payload_limit_t
        ));
        for slot in &wagon.slots {
            let loaded: Vec<&Product> = plan
                .assignments
                .iter()
                .filter(|a| a.wagon_id == wagon.id && a.slot_id == slot.id)
                .filter_map(|a| by_id.get(a.product_id.as_str()).copied())
                .collect();
            let weight: f64 = loaded.iter().map(|p| p.weight_t).sum();
            let labels = if loaded.is_empty() {
                "-".to_string()
            } else {
                loaded
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            out.push_str(&format!(
                "  {}: {:.1}/{:.1}t  {}\n",
                slot.id, weight, slot.max_weight_t, labels
            ));
        }
    }

    if !plan.unassigned_products.is_empty() {
        let labels = plan
            .unassigned_products
            .iter()
            .map(|id| match by_id.get(id.as_str()) {
                Some(p) => p.to_string(),
                None => id.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("Unassigned: {labels}\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::optimize_loading;
    use crate::types::{RakeTemplate, Slot, WagonParams};

    fn fixture() -> (Vec<Product>, RakeTemplate) {
        let products = vec![
            Product {
                id: "P1".into(),
                category: "COIL".into(),
                weight_t: 10.0,
                length_m: 4.0,
                width_m: 2.0,
                height_m: 2.0,
            },
            Product {
                id: "P4".into(),
                category: "PLATE".into(),
                weight_t: 40.0,
                length_m: 5.0,
                width_m: 2.5,
                height_m: 2.5,
            },
        ];
        let template = RakeTemplate {
            id: "RAKE_STD".into(),
            wagon_type: "BOXN".into(),
            num_wagons: 1,
            wagon_params: WagonParams {
                payload_limit_t: 60.0,
                length_m: 12.0,
                width_m: 3.0,
                height_m: 3.0,
                slots: vec![
                    Slot {
                        id: "S1".into(),
                        max_weight_t: 30.0,
                        max_length_m: 6.0,
                        max_width_m: 2.8,
                        max_height_m: 2.8,
                    },
                    Slot {
                        id: "S2".into(),
                        max_weight_t: 30.0,
                        max_length_m: 6.0,
                        max_width_m: 2.8,
                        max_height_m: 2.8,
                    },
                ],
            },
        };
        (products, template)
    }

    #[test]
    fn test_render_lists_wagons_slots_and_unassigned() {
        let (products, template) = fixture();
        let plan = optimize_loading(&products, &template, true, 5.0).unwrap();
        let out = render_plan(&plan, &products);
        assert!(out.contains("RAKE_STD_1 (payload 60.0t)"));
        assert!(out.contains("S1:"));
        assert!(out.contains("S2:"));
        assert!(out.contains("P1 (10.0t)"));
        assert!(out.contains("Unassigned: P4 (40.0t)"));
    }

    #[test]
    fn test_render_empty_plan_has_no_unassigned_section() {
        let (_, template) = fixture();
        let plan = optimize_loading(&[], &template, true, 5.0).unwrap();
        let out = render_plan(&plan, &[]);
        assert!(out.contains("RAKE_STD_1"));
        assert!(!out.contains("Unassigned"));
    }
}
