use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use pixelmind_client::{
    FileStore, FormFields, HttpClient, Identity, LoadStatus, Outcome, PixelMindApp,
    PixelMindError, Post, PostCard, PostsApi, SubmitStatus,
};
use tracing::debug;

mod logging;
mod settings;
mod shell;
mod view;

use logging::init_logging;
use settings::Settings;
use view::{TerminalView, format_card};

#[derive(Debug, Parser)]
#[command(name = "pixelmind-cli", version, about = "CLI клиент для PixelMind")]
struct Cli {
    /// Адрес API (по умолчанию PIXELMIND_API_URL или http://127.0.0.1:8000).
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Страница ленты (9 постов).
    Feed {
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },
    /// Изображения Unsplash: первая порция и ещё `--more` порций.
    Discover {
        #[arg(long, default_value_t = 0)]
        more: u32,
    },
    /// Пост по id.
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Новый пост от имени текущего пользователя.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        image: String,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Теги через запятую.
        #[arg(long)]
        tags: Option<String>,
    },
    /// Частичное обновление: отправляются только переданные поля.
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        tags: Option<String>,
    },
    /// Удаление поста.
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Показать текущего пользователя или сменить его (пустое имя сбрасывает).
    User { name: Option<String> },
    /// Проверка доступности API.
    Health,
    /// Интерактивная сессия.
    Shell,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let server = normalize_server(cli.server.unwrap_or_else(|| settings.api_url.clone()));
    let api = Arc::new(
        HttpClient::with_timeouts(
            server,
            settings.connect_timeout(),
            settings.request_timeout(),
        )
        .map_err(map_client_error)?,
    );
    debug!(server = %api.base_url(), data_dir = %settings.data_dir.display(), "starting");
    let identity = Identity::new(Arc::new(FileStore::new(settings.session_dir())));
    let app = PixelMindApp::new(
        api.clone(),
        identity.clone(),
        Arc::new(FileStore::new(settings.local_dir())),
        Arc::new(TerminalView::new()),
    );

    match cli.command {
        Command::Feed { page } => {
            if app.feed.load(page - 1).await == LoadStatus::Failed {
                bail!("не удалось загрузить ленту");
            }
        }
        Command::Discover { more } => {
            if app.discover.load_first().await == LoadStatus::Failed {
                bail!("не удалось загрузить изображения");
            }
            for _ in 0..more {
                match app.discover.load_more().await {
                    LoadStatus::Failed => bail!("не удалось загрузить изображения"),
                    LoadStatus::Exhausted => break,
                    _ => {}
                }
            }
        }
        Command::Get { id } => {
            require(app.search.search_by_id(id).await, &identity)?;
        }
        Command::Create {
            title,
            image,
            url,
            description,
            tags,
        } => {
            app.create.set_fields(FormFields {
                title,
                image,
                url: url.unwrap_or_default(),
                description: description.unwrap_or_default(),
                tags: tags.unwrap_or_default(),
            });
            let status = app.create.submit().await;
            let post = require_saved(status, &app.create.snapshot().status, &identity)?;
            print_post("Пост создан", &post);
        }
        Command::Update {
            id,
            title,
            image,
            url,
            description,
            tags,
        } => {
            let current = require(app.search.search_by_id(id).await, &identity)?;
            app.update.start_editing(&current);
            // Пустое поле в форме означает «не менять».
            app.update.set_fields(FormFields {
                title: title.unwrap_or_default(),
                image: image.unwrap_or_default(),
                url: url.unwrap_or_default(),
                description: description.unwrap_or_default(),
                tags: tags.unwrap_or_default(),
            });
            let status = app.update.submit().await;
            let post = require_saved(status, &app.update.snapshot().status, &identity)?;
            print_post("Пост обновлён", &post);
        }
        Command::Delete { id } => {
            let outcome = Outcome::from_result(
                "delete_post",
                api.delete_post(id, &identity.current()).await,
            );
            require(outcome, &identity)?;
            println!("Пост удалён: id={id}");
        }
        Command::User { name } => {
            if let Some(name) = name {
                identity
                    .set(&name)
                    .context("не удалось сохранить пользователя")?;
            }
            println!("Пользователь: {}", describe_user(&identity));
        }
        Command::Health => {
            let health = api.health().await.map_err(map_client_error)?;
            println!("API: ok={}, постов: {}", health.ok, health.count);
        }
        Command::Shell => shell::run(&app).await?,
    }

    Ok(())
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn describe_user(identity: &Identity) -> String {
    if identity.is_anonymous() {
        return format!("{} (не выбран, посты будут анонимными)", identity.current());
    }
    identity.current()
}

fn require<T>(outcome: Outcome<T>, identity: &Identity) -> Result<T> {
    match outcome {
        Outcome::Ok(value) => Ok(value),
        Outcome::Forbidden => Err(forbidden(identity)),
        Outcome::NotFound => Err(anyhow!("пост не найден")),
        Outcome::Failed => Err(anyhow!("запрос не выполнен, подробности в логе")),
    }
}

fn require_saved(status: SubmitStatus, form_status: &str, identity: &Identity) -> Result<Post> {
    match status {
        SubmitStatus::Saved(post) => Ok(post),
        SubmitStatus::Rejected => Err(anyhow!("некорректная форма: {form_status}")),
        SubmitStatus::Busy => Err(anyhow!("форма уже отправляется")),
        SubmitStatus::Forbidden => Err(forbidden(identity)),
        SubmitStatus::NotFound => Err(anyhow!("пост не найден")),
        SubmitStatus::Failed => Err(anyhow!("не удалось сохранить пост: {form_status}")),
    }
}

fn forbidden(identity: &Identity) -> anyhow::Error {
    anyhow!(
        "нет прав: пост принадлежит другому пользователю (текущий: {}), смените его через `pixelmind-cli user NAME`",
        identity.current()
    )
}

fn map_client_error(err: PixelMindError) -> anyhow::Error {
    let message = match err {
        PixelMindError::Forbidden => "доступ запрещён".to_string(),
        PixelMindError::NotFound => "ресурс не найден".to_string(),
        PixelMindError::Status { status, message } => {
            format!("сервер ответил {status}: {message}")
        }
        PixelMindError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
        PixelMindError::Http(err) => format!("ошибка HTTP: {err}"),
    };
    anyhow!(message)
}

fn print_post(title: &str, post: &Post) {
    println!("{title}");
    println!("{}", format_card(&PostCard::from(post)));
}
