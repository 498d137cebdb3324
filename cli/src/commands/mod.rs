use crate::display;
use clap::{Args, Parser, Subcommand, ValueEnum};
use nessus_core::{AgentQuery, Filter, FilterJoin, Nessus};

#[derive(Subcommand)]
pub enum AgentsCommand {
    #[command(about = "List agents, optionally filtered")]
    List(AgentsList),

    #[command(about = "Unlink one or more agents")]
    Unlink {
        #[arg(required = true, num_args = 1.., help = "Agent ids")]
        ids: Vec<u64>,
    },
}

#[derive(Args)]
pub struct AgentsList {
    #[arg(
        short,
        long = "filter",
        value_name = "NAME:OPERATOR:VALUE",
        help = "Filter to apply (repeatable)"
    )]
    pub filters: Vec<Filter>,
    #[arg(long, help = "Match any filter instead of all")]
    pub any: bool,
    #[arg(short, long, help = "Free-text search across name and address")]
    pub wildcard: Option<String>,
    #[arg(long, help = "Maximum number of agents to return")]
    pub limit: Option<u32>,
    #[arg(short, long, help = "Output in JSON format")]
    pub json: bool,
}

impl AgentsCommand {
    pub async fn run(&self, nessus: &Nessus) -> anyhow::Result<()> {
        match self {
            AgentsCommand::List(list) => {
                let mut query = AgentQuery::new().filter_type(if list.any {
                    FilterJoin::Or
                } else {
                    FilterJoin::And
                });
                query.filters = list.filters.clone();
                query.wildcard = list.wildcard.clone();
                query.limit = list.limit;

                let agents = nessus.agents().list(&query).await?;
                if list.json {
                    println!("{}", display::to_json(&serde_json::to_value(&agents)?)?);
                } else {
                    display::print_agents(&agents);
                }
            }
            AgentsCommand::Unlink { ids } => {
                match nessus.agents().unlink(ids.iter().copied()).await? {
                    Some(task) => println!("Unlink task started: {}", display::to_json(&task)?),
                    None => println!("Agent {} unlinked", ids[0]),
                }
            }
        }
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum AgentGroupsCommand {
    #[command(about = "List agent groups")]
    List {
        #[arg(short, long, help = "Output in JSON format")]
        json: bool,
    },
}

impl AgentGroupsCommand {
    pub async fn run(&self, nessus: &Nessus) -> anyhow::Result<()> {
        match self {
            AgentGroupsCommand::List { json } => {
                let groups = nessus.agent_groups().list().await?;
                if *json {
                    println!("{}", display::to_json(&serde_json::to_value(&groups)?)?);
                } else {
                    display::print_groups(&groups);
                }
            }
        }
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum FoldersCommand {
    #[command(about = "List scan folders")]
    List {
        #[arg(short, long, help = "Output in JSON format")]
        json: bool,
    },
}

impl FoldersCommand {
    pub async fn run(&self, nessus: &Nessus) -> anyhow::Result<()> {
        match self {
            FoldersCommand::List { json } => {
                let folders = nessus.folders().list().await?;
                if *json {
                    println!("{}", display::to_json(&serde_json::to_value(&folders)?)?);
                } else {
                    display::print_folders(&folders);
                }
            }
        }
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum ScansCommand {
    #[command(about = "List scans")]
    List {
        #[arg(long, help = "Only scans in this folder")]
        folder: Option<u64>,
        #[arg(short, long, help = "Output in JSON format")]
        json: bool,
    },
}

impl ScansCommand {
    pub async fn run(&self, nessus: &Nessus) -> anyhow::Result<()> {
        match self {
            ScansCommand::List { folder, json } => {
                let list = nessus.scans().list(*folder, None).await?;
                if *json {
                    println!("{}", display::to_json(&serde_json::to_value(&list)?)?);
                } else {
                    display::print_scans(&list);
                }
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Catalog {
    Agents,
    Reports,
}

#[derive(Parser)]
pub struct Filters {
    #[arg(value_enum, help = "Which filter catalog to show")]
    catalog: Catalog,
}

impl Filters {
    pub async fn run(&self, nessus: &Nessus) -> anyhow::Result<()> {
        let schema = match self.catalog {
            Catalog::Agents => nessus.filters().agents().await?,
            Catalog::Reports => nessus.filters().scan_reports().await?,
        };
        display::print_schema(&schema);
        Ok(())
    }
}
