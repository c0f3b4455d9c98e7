use chrono::{Local, NaiveDate};
use client::{CategoryDraft, Client, Expense, ExpenseDraft, ExpenseLimit, NewUser, PayDay};

use crate::{
    cli::{CategoryArgs, CategoryCommand, Command, ExpenseArgs, ExpenseCommand, ProfileCommand},
    error::{AppError, Result},
    local_state::LocalState,
};

pub async fn run(client: &Client, command: Command, state_path: &str) -> Result<()> {
    let mut state = LocalState::load(state_path)?;

    match command {
        Command::Login(args) => {
            // One caller-managed session for both calls instead of two scoped ones.
            client.authenticate().await?;
            let result = login(client, &args.email, &args.password).await;
            client.logout().await;

            let (user, categories) = result?;
            println!("Logged in as {} <{}>", user.full_name(), user.email);
            state.user = Some(user);
            state.categories = categories;
            state.save(state_path)?;
        }
        Command::Signup(args) => {
            client
                .create_user(&NewUser {
                    first_name: args.first_name,
                    last_name: args.last_name,
                    email: args.email,
                    password: args.password,
                })
                .await?;
            println!("Account created, you can now log in.");
        }
        Command::Logout => {
            client.logout().await;
            LocalState::default().save(state_path)?;
            println!("Logged out.");
        }
        Command::Categories(categories) => {
            let user_id = state.require_user()?.user_id.clone();
            match categories.command {
                CategoryCommand::List => {
                    state.categories = client.fetch_categories(&user_id).await?;
                    for category in &state.categories {
                        println!("{:>6}  {:<20} {:<16} {}", category.id, category.name, category.icon, category.color);
                    }
                }
                CategoryCommand::Add(args) => {
                    let category = client.create_category(&user_id, &draft_category(args)).await?;
                    println!("Created category {} ({})", category.name, category.id);
                    state.upsert_category(category);
                }
                CategoryCommand::Edit { id, category } => {
                    client.update_category(&id, &draft_category(category)).await?;
                    state.categories = client.fetch_categories(&user_id).await?;
                    println!("Updated category {id}");
                }
            }
            state.save(state_path)?;
        }
        Command::Expenses(expenses) => {
            let user_id = state.require_user()?.user_id.clone();
            match expenses.command {
                ExpenseCommand::List => {
                    for expense in client.fetch_expenses(&user_id).await? {
                        print_expense(&state, &expense);
                    }
                }
                ExpenseCommand::Show { id } => {
                    let expense = client.fetch_expense(&id).await?;
                    print_expense(&state, &expense);
                    if let Some(notes) = &expense.notes {
                        println!("        {notes}");
                    }
                }
                ExpenseCommand::Add(args) => {
                    let id = client.create_expense(&user_id, &draft_expense(args)?).await?;
                    println!("Created expense {id}");
                }
                ExpenseCommand::Edit { id, expense } => {
                    client.update_expense(&id, &draft_expense(expense)?).await?;
                    println!("Updated expense {id}");
                }
                ExpenseCommand::Delete { id } => {
                    client.delete_expense(&id).await?;
                    println!("Deleted expense {id}");
                }
            }
        }
        Command::Profile(profile) => {
            let mut user = state.require_user()?.clone();
            update_profile(client, &mut user, profile.command).await?;
            state.user = Some(user);
            state.save(state_path)?;
            println!("Profile updated.");
        }
        Command::DeleteAccount { yes } => {
            if !yes {
                return Err(AppError::Usage(
                    "this deletes the account and all its data; pass --yes to confirm".to_string(),
                ));
            }
            let user_id = state.require_user()?.user_id.clone();
            client.delete_user(&user_id).await?;
            LocalState::default().save(state_path)?;
            println!("Account deleted.");
        }
    }
    Ok(())
}

async fn login(
    client: &Client,
    email: &str,
    password: &str,
) -> client::Result<(client::User, Vec<client::Category>)> {
    let user = client.login_user(email, password).await?;
    let categories = client.fetch_categories(&user.user_id).await?;
    Ok((user, categories))
}

async fn update_profile(client: &Client, user: &mut client::User, command: ProfileCommand) -> Result<()> {
    let user_id = user.user_id.clone();
    match command {
        ProfileCommand::Currency { code } => {
            client.update_currency(&user_id, &code).await?;
            user.currency = Some(code.trim().to_uppercase());
        }
        ProfileCommand::Theme { theme } => {
            let theme = theme.parse()?;
            client.update_theme(&user_id, theme).await?;
            user.theme = Some(theme);
        }
        ProfileCommand::Password { new_password } => {
            client.update_password(&user_id, &new_password).await?;
        }
        ProfileCommand::Limit {
            kind,
            value,
            period,
            clear,
        } => {
            let limit = match (clear, kind, value, period) {
                (true, ..) => None,
                (false, Some(kind), Some(value), Some(period)) => Some(ExpenseLimit {
                    kind: kind.parse()?,
                    value,
                    period: period.parse()?,
                }),
                _ => {
                    return Err(AppError::Usage(
                        "--kind, --value and --period are required".to_string(),
                    ));
                }
            };
            client.update_expense_limit(&user_id, limit).await?;
            user.expense_limit = limit;
        }
        ProfileCommand::PayDay { day, clear } => {
            let pay_day = match (clear, day) {
                (true, _) | (false, None) => None,
                (false, Some(day)) => Some(PayDay::new(day)?),
            };
            client.update_pay_day(&user_id, pay_day).await?;
            user.pay_day = pay_day;
        }
    }
    Ok(())
}

fn draft_category(args: CategoryArgs) -> CategoryDraft {
    CategoryDraft {
        name: args.name,
        icon: args.icon,
        color: args.color,
    }
}

fn draft_expense(args: ExpenseArgs) -> Result<ExpenseDraft> {
    let date = match args.date.as_deref() {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|err| AppError::Usage(format!("invalid --date '{raw}': {err}")))?,
        None => Local::now().date_naive(),
    };
    Ok(ExpenseDraft {
        date,
        amount: args.amount.parse()?,
        category_id: args.category,
        payment_method: args.payment_method,
        description: args.description,
        kind: args.kind.parse()?,
        notes: args.notes,
    })
}

fn print_expense(state: &LocalState, expense: &Expense) {
    let marker = if expense.date_recovered { "?" } else { " " };
    println!(
        "{:>6}  {}{} {:<7} {:>10}  {:<16} {}",
        expense.id,
        expense.date,
        marker,
        expense.kind.as_str(),
        expense.amount.to_string(),
        state.category_name(expense.category_id.as_deref()),
        expense.description
    );
}
