use clap::Args;
use clearwatch_core::catalog::{self, GroupTable};
use serde::Serialize;

#[derive(Args)]
pub struct GroupsArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct GroupRow<'a> {
    selector: String,
    name: &'a str,
    hashes: Vec<u32>,
}

fn rows<'a>(prefix: &str, table: &'a GroupTable) -> Vec<GroupRow<'a>> {
    table
        .iter()
        .map(|group| GroupRow {
            selector: format!("{prefix}-{}", group.key),
            name: &group.name,
            hashes: group.hashes.iter().copied().collect(),
        })
        .collect()
}

pub fn run(args: GroupsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut all = rows("grouped-raid", catalog::grouped_raids());
    all.extend(rows("grouped-dungeon", catalog::grouped_dungeons()));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    let width = all.iter().map(|row| row.selector.len()).max().unwrap_or(0);
    for row in &all {
        println!("{:<width$}  {}", row.selector, row.name);
    }
    Ok(())
}
