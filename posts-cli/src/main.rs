use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use posts_client::{NewPostInput, Post, PostsClient, PostsClientError};

const DEFAULT_HTTP_SERVER: &str = "http://127.0.0.1:8080";

#[derive(Debug, Parser)]
#[command(name = "posts-cli", version, about = "CLI клиент для posts-server")]
struct Cli {
    /// Адрес HTTP-сервера.
    #[arg(long, global = true, env = "POSTS_SERVER")]
    server: Option<String>,

    /// Печатать посты в JSON вместо текстового вида.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::Args)]
struct PostArgs {
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    content: String,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    status: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Создание поста.
    Create {
        #[command(flatten)]
        post: PostArgs,
    },
    /// Получение поста по id.
    Get {
        #[arg(long)]
        id: String,
    },
    /// Список всех постов.
    List,
    /// Полная замена полей поста.
    Update {
        #[arg(long)]
        id: String,
        #[command(flatten)]
        post: PostArgs,
    },
    /// Удаление поста.
    Delete {
        #[arg(long)]
        id: String,
    },
}

impl From<PostArgs> for NewPostInput {
    fn from(args: PostArgs) -> Self {
        Self {
            title: args.title,
            content: args.content,
            author: args.author,
            status: args.status,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let server = resolve_server(cli.server);
    let client = PostsClient::new(server).map_err(map_client_error)?;
    let printer = Printer { json: cli.json };

    match cli.command {
        Command::Create { post } => {
            let created = client
                .create_post(&post.into())
                .await
                .map_err(map_client_error)?;
            match created.post {
                Some(post) => printer.post("Пост создан", &post)?,
                None => println!("Пост создан: id={}", created.id),
            }
        }
        Command::Get { id } => {
            let post = client.get_post(&id).await.map_err(map_client_error)?;
            printer.post("Пост", &post)?;
        }
        Command::List => {
            let posts = client.list_posts().await.map_err(map_client_error)?;
            printer.list(&posts)?;
        }
        Command::Update { id, post } => {
            let updated = client
                .update_post(&id, &post.into())
                .await
                .map_err(map_client_error)?;
            match updated {
                Some(post) => printer.post("Пост обновлён", &post)?,
                None => println!("Пост обновлён: id={id}"),
            }
        }
        Command::Delete { id } => {
            client.delete_post(&id).await.map_err(map_client_error)?;
            println!("Пост удалён: id={id}");
        }
    }

    Ok(())
}

fn resolve_server(server: Option<String>) -> String {
    let raw = server
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_HTTP_SERVER.to_string());
    normalize_server(raw)
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn map_client_error(err: PostsClientError) -> anyhow::Error {
    let message = match err {
        PostsClientError::NotFound => "пост не найден".to_string(),
        PostsClientError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
        PostsClientError::Server(message) => format!("ошибка сервера: {message}"),
        PostsClientError::MissingLocation => {
            "сервер не вернул заголовок Location для созданного поста".to_string()
        }
        PostsClientError::Http(err) => format!("ошибка HTTP: {err}"),
    };
    anyhow::anyhow!(message)
}

struct Printer {
    json: bool,
}

impl Printer {
    fn post(&self, title: &str, post: &Post) -> Result<()> {
        if self.json {
            let raw = serde_json::to_string_pretty(post).context("не удалось сериализовать пост")?;
            println!("{raw}");
            return Ok(());
        }

        println!("{title}");
        println!("id: {}", post.id);
        println!("title: {}", post.title);
        println!("content: {}", post.content);
        if let Some(author) = &post.author {
            println!("author: {author}");
        }
        if let Some(status) = &post.status {
            println!("status: {status}");
        }
        println!("created_at: {}", post.created_at);
        println!("updated_at: {}", post.updated_at);
        Ok(())
    }

    fn list(&self, posts: &[Post]) -> Result<()> {
        if self.json {
            let raw =
                serde_json::to_string_pretty(posts).context("не удалось сериализовать посты")?;
            println!("{raw}");
            return Ok(());
        }

        println!("Постов: {}", posts.len());
        for post in posts {
            println!("- [{}] {}", post.id, post.title);
        }
        Ok(())
    }
}
