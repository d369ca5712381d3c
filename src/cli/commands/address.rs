//! `innkeeper address` command - Explore the address hierarchy

use clap::Subcommand;
use miette::Result;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style};

use crate::api::{wire, RegistrationBackend};
use crate::cli::helpers::{connect, print_structured};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::entities::address::{AddressChain, AddressHierarchy};

#[derive(Subcommand, Debug)]
pub enum AddressCommands {
    /// Search parishes by name
    Search(SearchArgs),

    /// Show the region → sub-county chain above a parish
    Resolve(ResolveArgs),
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Part of a parish name (case-insensitive)
    pub query: String,

    /// Read the hierarchy from a JSON file instead of the backend
    #[arg(long, value_name = "FILE")]
    pub tree: Option<PathBuf>,

    /// Maximum number of results
    #[arg(long, short = 'n', default_value = "20")]
    pub limit: usize,
}

#[derive(clap::Args, Debug)]
pub struct ResolveArgs {
    /// Parish id
    pub parish_id: String,

    /// Read the hierarchy from a JSON file instead of the backend
    #[arg(long, value_name = "FILE")]
    pub tree: Option<PathBuf>,
}

pub fn run(cmd: AddressCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        AddressCommands::Search(args) => run_search(args, global),
        AddressCommands::Resolve(args) => run_resolve(args, global),
    }
}

/// Read an address tree saved from `address/getaddress`
pub fn load_tree(path: &Path) -> Result<AddressHierarchy> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| miette::miette!("Failed to read {}: {}", path.display(), e))?;
    let body: Value = serde_json::from_str(&text)
        .map_err(|e| miette::miette!("{} is not valid JSON: {}", path.display(), e))?;
    Ok(wire::address_hierarchy(body)?)
}

fn hierarchy(tree: Option<&Path>) -> Result<AddressHierarchy> {
    match tree {
        Some(path) => load_tree(path),
        None => {
            let client = connect(&Config::load())?;
            Ok(client.address_hierarchy()?)
        }
    }
}

fn chain_json(chain: &AddressChain) -> Value {
    json!({
        "parishId": chain.parish.id,
        "parish": chain.parish.name,
        "subCounty": chain.sub_county.name,
        "county": chain.county.name,
        "district": chain.district.name,
        "region": chain.region.name,
    })
}

fn print_chains(chains: &[AddressChain], format: OutputFormat) -> Result<()> {
    let values: Vec<Value> = chains.iter().map(chain_json).collect();
    if print_structured(format, &values)? {
        return Ok(());
    }

    if format == OutputFormat::Tsv {
        for c in chains {
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                c.parish.id,
                c.parish.name,
                c.sub_county.name,
                c.county.name,
                c.district.name,
                c.region.name
            );
        }
        return Ok(());
    }

    let mut table = Builder::default();
    table.push_record(["ID", "Parish", "Sub-county", "County", "District", "Region"]);
    for c in chains {
        table.push_record([
            c.parish.id.as_str(),
            c.parish.name.as_str(),
            c.sub_county.name.as_str(),
            c.county.name.as_str(),
            c.district.name.as_str(),
            c.region.name.as_str(),
        ]);
    }
    let mut table = table.build();
    if format == OutputFormat::Md {
        table.with(Style::markdown());
    } else {
        table.with(Style::rounded());
    }
    println!("{}", table);
    Ok(())
}

fn run_search(args: SearchArgs, global: &GlobalOpts) -> Result<()> {
    let hierarchy = hierarchy(args.tree.as_deref())?;
    let chains: Vec<AddressChain> = hierarchy
        .search_parishes(&args.query)
        .into_iter()
        .take(args.limit)
        .map(|p| hierarchy.fill_address_hierarchy(&p.id))
        .collect();

    if chains.is_empty() {
        if !global.quiet {
            eprintln!("No parish matches '{}'", args.query);
        }
        return Ok(());
    }
    print_chains(&chains, global.format)
}

fn run_resolve(args: ResolveArgs, global: &GlobalOpts) -> Result<()> {
    let hierarchy = hierarchy(args.tree.as_deref())?;
    let chain = hierarchy.fill_address_hierarchy(&args.parish_id);
    if !chain.parish.is_resolved() {
        return Err(miette::miette!("Unknown parish id '{}'", args.parish_id));
    }
    print_chains(&[chain], global.format)
}
