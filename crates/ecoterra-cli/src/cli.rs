//! Command-line argument parsing.

use clap::{Parser, Subcommand};
use ecoterra_core::Category;

#[derive(Parser, Debug)]
#[command(name = "ecoterra")]
#[command(version)]
#[command(about = "Ecoterra session manager")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Log in and store the session
    Login {
        /// Account email (prompted for when omitted)
        email: Option<String>,

        /// Ask the server to remember this device
        #[arg(long)]
        remember: bool,

        #[command(flatten)]
        password: PasswordArg,
    },

    /// Create an account
    Register {
        /// Full name, quoted if it contains spaces
        full_name: String,
        username: String,
        email: String,

        /// One of: guru, murid, masyarakat
        #[arg(value_parser = parse_category)]
        category: Category,

        #[command(flatten)]
        password: PasswordArg,
    },

    /// Log out and clear the stored session
    Logout,

    /// Show the stored session without contacting the server
    Status,

    /// Check the stored session with the server
    Verify,
}

/// Password for non-interactive use; prompted for when absent.
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordArg {
    #[arg(long, env = "ECOTERRA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse::<Category>().map_err(|e| {
        let expected: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        format!("{} (expected one of: {})", e, expected.join(", "))
    })
}
