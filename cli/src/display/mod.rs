use colored::Colorize;
use nessus_core::{Agent, AgentGroup, FilterSchema, Folder, ScanList};
use serde_json::Value;

pub fn print_agents(agents: &[Agent]) {
    if agents.is_empty() {
        println!("No agents found");
        return;
    }

    let header = format!(
        "{:<8} {:<28} {:<10} {:<16} {}",
        "ID", "NAME", "PLATFORM", "IP", "STATUS"
    );
    println!("{}", header.bold());
    for agent in agents {
        let status = agent.status.as_deref().unwrap_or("-");
        let status = match status {
            "online" => status.green(),
            "offline" => status.red(),
            _ => status.yellow(),
        };
        println!(
            "{:<8} {:<28} {:<10} {:<16} {}",
            agent.id,
            agent.name,
            agent.platform.as_deref().unwrap_or("-"),
            agent.ip.as_deref().unwrap_or("-"),
            status
        );
    }
    println!();
    println!("{} agent(s)", agents.len());
}

pub fn print_groups(groups: &[AgentGroup]) {
    if groups.is_empty() {
        println!("No agent groups found");
        return;
    }

    println!("{}", format!("{:<8} {:<32} {}", "ID", "NAME", "AGENTS").bold());
    for group in groups {
        println!(
            "{:<8} {:<32} {}",
            group.id,
            group.name,
            group
                .agents_count
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }
}

pub fn print_folders(folders: &[Folder]) {
    println!("{}", format!("{:<8} {:<32} {}", "ID", "NAME", "TYPE").bold());
    for folder in folders {
        let kind = folder.kind.as_deref().unwrap_or("-");
        let kind = if folder.is_custom() { kind.cyan() } else { kind.normal() };
        println!("{:<8} {:<32} {}", folder.id, folder.name, kind);
    }
}

pub fn print_scans(list: &ScanList) {
    if list.scans.is_empty() {
        println!("No scans found");
        return;
    }

    println!("{}", format!("{:<8} {:<40} {:<8} {}", "ID", "NAME", "FOLDER", "STATUS").bold());
    for scan in &list.scans {
        let status = scan.status.as_deref().unwrap_or("-");
        let status = match status {
            "completed" => status.green(),
            "running" => status.cyan(),
            "aborted" | "canceled" => status.red(),
            _ => status.normal(),
        };
        println!(
            "{:<8} {:<40} {:<8} {}",
            scan.id,
            scan.name,
            scan.folder_id.map(|f| f.to_string()).unwrap_or_else(|| "-".to_string()),
            status
        );
    }
}

pub fn print_schema(schema: &FilterSchema) {
    for name in schema.names() {
        let Some(descriptor) = schema.get(name) else {
            continue;
        };
        let operators: Vec<&str> = descriptor.operators().collect();
        println!("{} [{}]", name.bold(), operators.join(", "));
        if let Some(choices) = descriptor.choices() {
            let choices: Vec<&str> = choices.collect();
            if !choices.is_empty() {
                println!("    choices: {}", choices.join(", "));
            }
        }
    }
}

pub fn to_json(value: &Value) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
