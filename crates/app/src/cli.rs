use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "walletwatch")]
#[command(about = "Track expenses against a FileMaker Data API backend")]
pub struct Cli {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override the server root (e.g. https://fm.example.com).
    #[arg(long, global = true)]
    pub server_url: Option<String>,
    /// Override the database name.
    #[arg(long, global = true)]
    pub database: Option<String>,
    /// Override the local state file.
    #[arg(long, global = true)]
    pub state: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and cache the user and their categories.
    Login(LoginArgs),
    /// Create an account.
    Signup(SignupArgs),
    /// Forget the cached user and close any open session.
    Logout,
    Categories(Categories),
    Expenses(Expenses),
    Profile(Profile),
    /// Delete the logged-in account.
    DeleteAccount {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    /// Account password (also read from `WALLETWATCH_PASSWORD`).
    #[arg(long, env = "WALLETWATCH_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct SignupArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "WALLETWATCH_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct Categories {
    #[command(subcommand)]
    pub command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    List,
    Add(CategoryArgs),
    Edit {
        #[arg(long)]
        id: String,
        #[command(flatten)]
        category: CategoryArgs,
    },
}

#[derive(Args, Debug)]
pub struct CategoryArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub icon: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
}

#[derive(Args, Debug)]
pub struct Expenses {
    #[command(subcommand)]
    pub command: ExpenseCommand,
}

#[derive(Subcommand, Debug)]
pub enum ExpenseCommand {
    List,
    Show {
        #[arg(long)]
        id: String,
    },
    Add(ExpenseArgs),
    Edit {
        #[arg(long)]
        id: String,
        #[command(flatten)]
        expense: ExpenseArgs,
    },
    Delete {
        #[arg(long)]
        id: String,
    },
}

#[derive(Args, Debug)]
pub struct ExpenseArgs {
    /// Decimal amount, `.` or `,` as separator.
    #[arg(long)]
    pub amount: String,
    /// `YYYY-MM-DD`; defaults to today.
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub category: String,
    #[arg(long, default_value = "Cash")]
    pub payment_method: String,
    #[arg(long)]
    pub description: String,
    /// `income` or `expense`.
    #[arg(long, default_value = "expense")]
    pub kind: String,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct Profile {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    Currency { code: String },
    /// `light` or `dark`.
    Theme { theme: String },
    Password {
        #[arg(long, env = "WALLETWATCH_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
    /// Set a spending limit, or remove it with `--clear`.
    Limit {
        /// `percentage` or `amount`.
        #[arg(long, required_unless_present = "clear")]
        kind: Option<String>,
        #[arg(long, required_unless_present = "clear")]
        value: Option<f64>,
        /// `week`, `month` or `year`.
        #[arg(long, required_unless_present = "clear")]
        period: Option<String>,
        #[arg(long)]
        clear: bool,
    },
    /// Day of the month (1-28) budgets restart on, or `--clear` for calendar months.
    PayDay {
        #[arg(required_unless_present = "clear")]
        day: Option<u8>,
        #[arg(long)]
        clear: bool,
    },
}
