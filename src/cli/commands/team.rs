//! `dit team` command - team roster management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::open_workspace;
use crate::cli::GlobalOpts;
use crate::core::{Role, TeamMember, TeamRoster};

#[derive(Subcommand, Debug)]
pub enum TeamCommands {
    /// Create an empty team roster
    Init,

    /// Add a member to the roster
    Add(AddArgs),

    /// List roster members
    List,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Full name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Email address
    #[arg(long, short = 'e')]
    pub email: String,

    /// Username (matches the configured author)
    #[arg(long, short = 'u')]
    pub username: String,

    /// Role (repeatable)
    #[arg(long, short = 'r', value_enum)]
    pub role: Vec<Role>,
}

pub fn run(cmd: TeamCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TeamCommands::Init => run_init(global),
        TeamCommands::Add(args) => run_add(args, global),
        TeamCommands::List => run_list(global),
    }
}

fn run_init(global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    if TeamRoster::load(&ws).is_some() {
        miette::bail!("team roster already exists at .dit/team.yaml");
    }
    TeamRoster::default().save(&ws).into_diagnostic()?;
    if !global.quiet {
        println!("{} created .dit/team.yaml", style("✓").green());
    }
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let mut roster = TeamRoster::load(&ws).unwrap_or_default();

    if roster.members.iter().any(|m| m.username == args.username) {
        miette::bail!("member '{}' is already on the roster", args.username);
    }

    let roles = if args.role.is_empty() {
        vec![Role::Inspector]
    } else {
        args.role
    };
    roster.members.push(TeamMember {
        name: args.name,
        email: args.email,
        username: args.username.clone(),
        roles,
        active: true,
    });
    roster.save(&ws).into_diagnostic()?;

    if !global.quiet {
        println!("{} added {}", style("✓").green(), args.username);
    }
    Ok(())
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let roster = TeamRoster::load(&ws)
        .ok_or_else(|| miette::miette!("no team roster; run 'dit team init' first"))?;

    let mut builder = Builder::default();
    builder.push_record(["Username", "Name", "Email", "Roles", "Active"]);
    for member in &roster.members {
        let roles = member
            .roles
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        builder.push_record([
            member.username.clone(),
            member.name.clone(),
            member.email.clone(),
            roles,
            if member.active { "yes" } else { "no" }.to_string(),
        ]);
    }
    println!("{}", builder.build().with(Style::modern()));
    Ok(())
}
