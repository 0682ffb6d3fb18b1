use std::time::{Duration, Instant};

use crate::error::OptimizeError;
use crate::expand::expand;
use crate::types::{Assignment, LoadPlan, Product, RakeTemplate, SolveStatus, Wagon};

const WEIGHT_EPS: f64 = 1e-9;

pub fn optimize_loading(
    products: &[Product],
    template: &RakeTemplate,
    allow_unassigned: bool,
    max_time_sec: f64,
) -> Result<LoadPlan, OptimizeError> {
    Loader::new(products.to_vec(), template, allow_unassigned, max_time_sec)?.solve()
}

pub struct Loader {
    products: Vec<Product>,
    wagons: Vec<Wagon>,
    template_id: String,
    allow_unassigned: bool,
    time_limit: Duration,
}

// One entry per (wagon, slot) pair, in wagon order.
#[derive(Debug, Clone, Copy)]
struct SlotState {
    wagon_idx: usize,
    slot_idx: usize,
    remaining_t: f64,
}

struct SearchCtx {
    // product indices, heaviest first
    order: Vec<usize>,
    // per product: flat slot indices whose dimensions and unit weight admit it
    candidates: Vec<Vec<usize>>,
    // suffix_weight[d] = total weight of order[d..]
    suffix_weight: Vec<f64>,
    slots: Vec<SlotState>,
    choice: Vec<Option<usize>>,
    loaded_t: f64,
    total_weight_t: f64,
    best: Option<Vec<Option<usize>>>,
    best_loaded_t: f64,
    deadline: Instant,
    timed_out: bool,
    nodes: u64,
}

impl Loader {
    pub fn new(
        products: Vec<Product>,
        template: &RakeTemplate,
        allow_unassigned: bool,
        max_time_sec: f64,
    ) -> Result<Self, OptimizeError> {
        let wagons = expand(template)?;
        Ok(Self {
            products,
            wagons,
            template_id: template.id.clone(),
            allow_unassigned,
            time_limit: Duration::from_secs_f64(max_time_sec.max(0.0)),
        })
    }

    pub fn solve(&self) -> Result<LoadPlan, OptimizeError> {
        let mut ctx = self.build_ctx()?;
        tracing::debug!(
            template = %self.template_id,
            products = self.products.len(),
            slots = ctx.slots.len(),
            "loading model built"
        );

        self.greedy_seed(&mut ctx);

        // A full load cannot be improved on; anything less goes to the search.
        let full_load =
            ctx.best.is_some() && ctx.best_loaded_t + WEIGHT_EPS >= ctx.total_weight_t;
        if !full_load {
            self.dive(&mut ctx, 0);
        }

        let status = if ctx.timed_out {
            SolveStatus::TimeLimited
        } else {
            SolveStatus::Optimal
        };

        let best = match ctx.best.take() {
            Some(choice) => choice,
            None => {
                // only reachable in strict mode
                let reason = if ctx.timed_out {
                    format!(
                        "time limit reached before a complete assignment was found for template {}",
                        self.template_id
                    )
                } else {
                    format!(
                        "no complete assignment exists for template {}",
                        self.template_id
                    )
                };
                return Err(OptimizeError::InfeasibleAssignment(reason));
            }
        };

        let plan = self.build_plan(&ctx, &best, status);
        tracing::debug!(
            template = %self.template_id,
            nodes = ctx.nodes,
            total_loaded_t = plan.total_loaded_t,
            status = %plan.status,
            "solve finished"
        );
        Ok(plan)
    }

    fn build_ctx(&self) -> Result<SearchCtx, OptimizeError> {
        let slots: Vec<SlotState> = self
            .wagons
            .iter()
            .enumerate()
            .flat_map(|(wi, wagon)| {
                wagon.slots.iter().enumerate().map(move |(si, slot)| SlotState {
                    wagon_idx: wi,
                    slot_idx: si,
                    remaining_t: slot.max_weight_t,
                })
            })
            .collect();

        // Pairs that can never hold are dropped up front: the solver only ever
        // sees dimension- and unit-weight-feasible choices.
        let candidates: Vec<Vec<usize>> = self
            .products
            .iter()
            .map(|product| {
                slots
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| {
                        let slot = &self.wagons[s.wagon_idx].slots[s.slot_idx];
                        product.fits_in(slot) && product.weight_t <= slot.max_weight_t
                    })
                    .map(|(idx, _)| idx)
                    .collect()
            })
            .collect();

        if !self.allow_unassigned {
            for (pi, slots_for) in candidates.iter().enumerate() {
                if slots_for.is_empty() {
                    return Err(OptimizeError::InfeasibleAssignment(format!(
                        "product {} fits no slot of template {}",
                        self.products[pi].id, self.template_id
                    )));
                }
            }
        }

        let mut order: Vec<usize> = (0..self.products.len()).collect();
        order.sort_by(|&a, &b| {
            self.products[b]
                .weight_t
                .total_cmp(&self.products[a].weight_t)
        });

        let mut suffix_weight = vec![0.0; order.len() + 1];
        for d in (0..order.len()).rev() {
            suffix_weight[d] = suffix_weight[d + 1] + self.products[order[d]].weight_t;
        }
        let total_weight_t = suffix_weight.first().copied().unwrap_or(0.0);

        Ok(SearchCtx {
            choice: vec![None; self.products.len()],
            order,
            candidates,
            suffix_weight,
            slots,
            loaded_t: 0.0,
            total_weight_t,
            best: None,
            best_loaded_t: 0.0,
            deadline: Instant::now() + self.time_limit,
            timed_out: false,
            nodes: 0,
        })
    }

    // Greedy phase: heaviest product first, emptiest compatible slot first.
    // The result seeds the incumbent so a time-limited search still returns
    // a feasible plan.
    fn greedy_seed(&self, ctx: &mut SearchCtx) {
        let mut remaining: Vec<f64> = ctx.slots.iter().map(|s| s.remaining_t).collect();
        let mut choice = vec![None; self.products.len()];
        let mut loaded_t = 0.0;

        for &pi in &ctx.order {
            let weight = self.products[pi].weight_t;
            let mut best: Option<usize> = None;
            for &si in &ctx.candidates[pi] {
                if weight > remaining[si] + WEIGHT_EPS {
                    continue;
                }
                if best.is_none_or(|b| remaining[si] > remaining[b]) {
                    best = Some(si);
                }
            }
            if let Some(si) = best {
                remaining[si] -= weight;
                choice[pi] = Some(si);
                loaded_t += weight;
            }
        }

        // a partial greedy assignment is no incumbent in strict mode
        if self.allow_unassigned || choice.iter().all(|c| c.is_some()) {
            ctx.best_loaded_t = loaded_t;
            ctx.best = Some(choice);
        }
    }

    // Depth-first branch and bound over the products in `ctx.order`.
    // Returns true when the search should unwind completely.
    fn dive(&self, ctx: &mut SearchCtx, depth: usize) -> bool {
        ctx.nodes += 1;
        if Instant::now() >= ctx.deadline {
            ctx.timed_out = true;
            return true;
        }

        if depth == ctx.order.len() {
            if ctx.best.is_none() || ctx.loaded_t > ctx.best_loaded_t + WEIGHT_EPS {
                ctx.best_loaded_t = ctx.loaded_t;
                ctx.best = Some(ctx.choice.clone());
            }
            // Every leaf in strict mode carries the full product set, and a
            // full load cannot be improved on in either mode.
            return !self.allow_unassigned
                || ctx.best_loaded_t + WEIGHT_EPS >= ctx.total_weight_t;
        }

        // Bound: even loading every remaining product cannot beat the incumbent.
        if ctx.best.is_some()
            && ctx.loaded_t + ctx.suffix_weight[depth] <= ctx.best_loaded_t + WEIGHT_EPS
        {
            return false;
        }

        let pi = ctx.order[depth];
        let weight = self.products[pi].weight_t;

        // Emptiest slot first. Wagons are clones of one spec, so slots sharing
        // a within-wagon index are interchangeable when equally full; trying
        // one of each equivalence class per node is enough.
        let mut open: Vec<usize> = ctx.candidates[pi]
            .iter()
            .copied()
            .filter(|&si| weight <= ctx.slots[si].remaining_t + WEIGHT_EPS)
            .collect();
        open.sort_by(|&a, &b| {
            ctx.slots[b]
                .remaining_t
                .total_cmp(&ctx.slots[a].remaining_t)
        });

        let mut tried: Vec<(usize, u64)> = Vec::new();
        for si in open {
            let key = (ctx.slots[si].slot_idx, ctx.slots[si].remaining_t.to_bits());
            if tried.contains(&key) {
                continue;
            }
            tried.push(key);

            let prev_remaining = ctx.slots[si].remaining_t;
            let prev_loaded = ctx.loaded_t;
            ctx.slots[si].remaining_t = prev_remaining - weight;
            ctx.choice[pi] = Some(si);
            ctx.loaded_t = prev_loaded + weight;

            let stop = self.dive(ctx, depth + 1);

            ctx.slots[si].remaining_t = prev_remaining;
            ctx.choice[pi] = None;
            ctx.loaded_t = prev_loaded;

            if stop {
                return true;
            }
        }

        if self.allow_unassigned {
            return self.dive(ctx, depth + 1);
        }
        false
    }

    fn build_plan(&self, ctx: &SearchCtx, choice: &[Option<usize>], status: SolveStatus) -> LoadPlan {
        let mut assignments = Vec::new();
        let mut unassigned_products = Vec::new();
        let mut total_loaded_t = 0.0;

        for (pi, product) in self.products.iter().enumerate() {
            match choice[pi] {
                Some(si) => {
                    let slot = ctx.slots[si];
                    let wagon = &self.wagons[slot.wagon_idx];
                    assignments.push(Assignment {
                        product_id: product.id.clone(),
                        wagon_id: wagon.id.clone(),
                        slot_id: wagon.slots[slot.slot_idx].id.clone(),
                    });
                    total_loaded_t += product.weight_t;
                }
                None => unassigned_products.push(product.id.clone()),
            }
        }

        let total_capacity_t: f64 = self.wagons.iter().map(|w| w.payload_limit_t).sum();
        let utilization_pct = if total_capacity_t > 0.0 {
            total_loaded_t / total_capacity_t * 100.0
        } else {
            0.0
        };

        LoadPlan {
            wagons: self.wagons.clone(),
            assignments,
            unassigned_products,
            total_loaded_t,
            utilization_pct,
            status,
        }
    }
}
