use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use reqwest::{header, Client, Response};
use shared_types::{AuthUserResponse, CreateTodoRequest, ErrorResponse, Todo, UpdateTodoRequest};
use todo_backend::auth::CookieCipher;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "todo-cli")]
#[command(about = "CLI for managing your todos via the backend API")]
#[command(
    long_about = "A command-line interface for interacting with the todo backend server.\n\n\
    Requests are authenticated with a session token. Log in through the browser\n\
    (/api/auth/google), copy the value of the session cookie and pass it with\n\
    --token or TODO_API_TOKEN."
)]
struct Cli {
    /// Backend server URL to connect to.
    #[arg(
        short,
        long,
        default_value = "http://localhost:4000",
        env = "TODO_API_URL"
    )]
    base_url: String,

    /// Session token, sent as the session cookie.
    #[arg(short, long, env = "TODO_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Name of the session cookie.
    #[arg(long, default_value = "_t", env = "AUTH_COOKIE_NAME")]
    cookie_name: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage todos - create, list, delete, and mark as done
    Todos {
        #[command(subcommand)]
        action: TodoAction,
    },
    /// Show the user the token belongs to
    Whoami,
    /// Print a fresh base64 key for COOKIE_ENCRYPTION_KEY
    Keygen,
}

#[derive(Subcommand)]
enum TodoAction {
    /// List your todos with their current status
    ///
    /// Displays todos with a checkbox indicator (○ pending, ✓ done)
    /// and their short ID.
    List,

    /// Create a new todo item
    Create {
        /// The text of the todo item.
        text: String,
    },

    /// Mark a todo as done
    Done {
        /// The UUID of the todo to mark as done.
        /// Use 'todos list' to find the ID (shown in brackets).
        id: Uuid,
    },

    /// Mark a todo as not done (reopen)
    Undo {
        /// The UUID of the todo to reopen.
        id: Uuid,
    },

    /// Permanently delete a todo
    ///
    /// This action cannot be undone.
    Delete {
        /// The UUID of the todo to delete.
        id: Uuid,
    },
}

fn short_id(id: &Uuid) -> String {
    id.to_string()[..8].to_string()
}

fn build_client(cli: &Cli) -> anyhow::Result<Client> {
    let token = cli
        .token
        .as_deref()
        .context("A session token is required (--token or TODO_API_TOKEN)")?;

    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::COOKIE,
        header::HeaderValue::from_str(&format!("{}={}", cli.cookie_name, token))
            .context("Session token contains invalid characters")?,
    );

    Ok(Client::builder().default_headers(headers).build()?)
}

/// Turn non-success responses into an error carrying the server's message.
async fn check(response: Response) -> anyhow::Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorResponse>()
        .await
        .map(|e| e.message)
        .unwrap_or_else(|_| status.to_string());
    bail!("{} ({})", message, status)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Keygen => {
            println!("{}", CookieCipher::generate_key());
        }
        Commands::Whoami => {
            let client = build_client(&cli)?;
            let me: AuthUserResponse = check(
                client
                    .get(format!("{}/api/auth/me", cli.base_url))
                    .send()
                    .await?,
            )
            .await?
            .json()
            .await?;
            println!("{}", me.name);
            if let Some(email) = &me.email {
                println!("    {}", email);
            }
        }
        Commands::Todos { action } => {
            let client = build_client(&cli)?;
            handle_todos(&client, &cli.base_url, action).await?
        }
    }

    Ok(())
}

async fn set_done(client: &Client, url: &str, id: &Uuid, done: bool) -> anyhow::Result<Todo> {
    let todo = check(
        client
            .put(format!("{}/{}", url, id))
            .json(&UpdateTodoRequest { done })
            .send()
            .await?,
    )
    .await?
    .json()
    .await?;
    Ok(todo)
}

async fn handle_todos(client: &Client, base_url: &str, action: &TodoAction) -> anyhow::Result<()> {
    let url = format!("{}/api/todos", base_url);

    match action {
        TodoAction::List => {
            let todos: Vec<Todo> = check(client.get(&url).send().await?).await?.json().await?;
            if todos.is_empty() {
                println!("No todos found.");
            } else {
                for todo in todos {
                    let status = if todo.done { "✓" } else { "○" };
                    println!("{} [{}] {}", status, short_id(&todo.id), todo.text);
                }
            }
        }
        TodoAction::Create { text } => {
            let req = CreateTodoRequest { text: text.clone() };
            let todo: Todo = check(client.post(&url).json(&req).send().await?)
                .await?
                .json()
                .await?;
            println!("Created todo: [{}] {}", short_id(&todo.id), todo.text);
        }
        TodoAction::Done { id } => {
            let todo = set_done(client, &url, id, true).await?;
            println!("Marked as done: [{}] {}", short_id(&todo.id), todo.text);
        }
        TodoAction::Undo { id } => {
            let todo = set_done(client, &url, id, false).await?;
            println!("Marked as not done: [{}] {}", short_id(&todo.id), todo.text);
        }
        TodoAction::Delete { id } => {
            check(client.delete(format!("{}/{}", url, id)).send().await?).await?;
            println!("Deleted todo: {}", id);
        }
    }

    Ok(())
}
