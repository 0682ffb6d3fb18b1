use std::path::{Path, PathBuf};

use clap::Parser;
use rake_optimizer::loader::optimize_loading;
use rake_optimizer::render;
use rake_optimizer::selector::choose_best_rake;
use rake_optimizer::types::{LoadPlan, Product, RakeTemplate};

#[derive(Parser)]
#[command(
    name = "rake_optimizer",
    about = "Rake loading optimizer: assigns freight products to wagon slots"
)]
struct Cli {
    /// JSON file with the product list
    #[arg(long)]
    products: PathBuf,

    /// JSON file with one or more rake templates
    #[arg(long)]
    templates: PathBuf,

    /// Require every product to be assigned
    #[arg(long)]
    strict: bool,

    /// Wall-clock solve budget in seconds
    #[arg(long, default_value_t = 10.0)]
    time_limit: f64,

    /// Show the per-wagon loading layout
    #[arg(long)]
    layout: bool,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> T {
    let data = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error: cannot read {} file {}: {}", what, path.display(), e);
        std::process::exit(1);
    });
    serde_json::from_str(&data).unwrap_or_else(|e| {
        eprintln!("Error: cannot parse {} file {}: {}", what, path.display(), e);
        std::process::exit(1);
    })
}

fn main() {
    let cli = Cli::parse();
    let products: Vec<Product> = read_json(&cli.products, "products");
    let templates: Vec<RakeTemplate> = read_json(&cli.templates, "templates");

    let allow_unassigned = !cli.strict;
    let (plan, template_id): (LoadPlan, String) = if templates.len() == 1 {
        let plan = optimize_loading(&products, &templates[0], allow_unassigned, cli.time_limit)
            .unwrap_or_else(|e| {
                eprintln!("Error: {e}");
                std::process::exit(1);
            });
        (plan, templates[0].id.clone())
    } else {
        let (plan, template) = choose_best_rake(&products, &templates, allow_unassigned)
            .unwrap_or_else(|e| {
                eprintln!("Error: {e}");
                std::process::exit(1);
            });
        (plan, template.id)
    };

    for a in &plan.assignments {
        println!("{} -> {} / {}", a.product_id, a.wagon_id, a.slot_id);
    }
    if cli.layout {
        print!("{}", render::render_plan(&plan, &products));
    }

    println!();
    println!(
        "Summary: template {}, {} ({:.1}t loaded, {:.1}% utilization, {} unassigned)",
        template_id,
        plan.status,
        plan.total_loaded_t,
        plan.utilization_pct,
        plan.unassigned_products.len(),
    );
}
