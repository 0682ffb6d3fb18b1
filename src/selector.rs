use crate::error::OptimizeError;
use crate::loader::optimize_loading;
use crate::types::{LoadPlan, Product, RakeTemplate};

const CANDIDATE_TIME_BUDGET_SEC: f64 = 10.0;
const UTILIZATION_EPS: f64 = 1e-6;

pub fn choose_best_rake(
    products: &[Product],
    candidates: &[RakeTemplate],
    allow_unassigned: bool,
) -> Result<(LoadPlan, RakeTemplate), OptimizeError> {
    if candidates.is_empty() {
        return Err(OptimizeError::InvalidTemplate(
            "no candidate templates supplied".into(),
        ));
    }

    let mut best: Option<(LoadPlan, &RakeTemplate)> = None;
    let mut infeasible: Vec<String> = Vec::new();

    for template in candidates {
        let plan = match optimize_loading(
            products,
            template,
            allow_unassigned,
            CANDIDATE_TIME_BUDGET_SEC,
        ) {
            Ok(plan) => plan,
            Err(err @ OptimizeError::InvalidTemplate(_)) => return Err(err),
            Err(OptimizeError::InfeasibleAssignment(_)) => {
                infeasible.push(template.id.clone());
                continue;
            }
        };
        tracing::debug!(
            template = %template.id,
            unassigned = plan.unassigned_products.len(),
            utilization_pct = plan.utilization_pct,
            "candidate solved"
        );
        let improves = match &best {
            None => true,
            Some((incumbent, _)) => ranks_above(&plan, incumbent),
        };
        if improves {
            best = Some((plan, template));
        }
    }

    match best {
        Some((plan, template)) => Ok((plan, template.clone())),
        None => Err(OptimizeError::InfeasibleAssignment(format!(
            "no candidate template admits a complete assignment: {}",
            infeasible.join(", ")
        ))),
    }
}

// Coverage first, then the tighter-fitting rake. Ties keep the earlier candidate.
fn ranks_above(plan: &LoadPlan, incumbent: &LoadPlan) -> bool {
    if plan.unassigned_products.len() != incumbent.unassigned_products.len() {
        return plan.unassigned_products.len() < incumbent.unassigned_products.len();
    }
    plan.utilization_pct > incumbent.utilization_pct + UTILIZATION_EPS
}
