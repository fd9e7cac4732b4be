use std::io::Write;

use anyhow::{Context, Result};
use pixelmind_client::{FormFields, Outcome, PixelMindApp, PostsApi};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "\
Команды:
  next | prev | reload      листать ленту
  page N                    перейти на страницу N (с 1)
  more                      ещё изображения discover
  discover                  перезагрузить discover
  get ID                    найти пост по id
  edit ID                   редактировать свой пост с текущей страницы
  set FIELD VALUE           поле формы: title, image, url, description, tags
  save                      отправить форму (редактирование или новый пост)
  cancel                    отменить редактирование
  delete ID                 удалить пост
  user [NAME]               показать или сменить пользователя
  help | quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Image,
    Url,
    Description,
    Tags,
}

impl FormField {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "title" => Some(Self::Title),
            "image" => Some(Self::Image),
            "url" => Some(Self::Url),
            "description" => Some(Self::Description),
            "tags" => Some(Self::Tags),
            _ => None,
        }
    }

    fn apply(self, fields: &mut FormFields, value: String) {
        match self {
            Self::Title => fields.title = value,
            Self::Image => fields.image = value,
            Self::Url => fields.url = value,
            Self::Description => fields.description = value,
            Self::Tags => fields.tags = value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Empty,
    Next,
    Prev,
    Reload,
    Page(u32),
    More,
    Discover,
    Get(String),
    Edit(i64),
    Set(FormField, String),
    Save,
    Cancel,
    Delete(i64),
    User(Option<String>),
    Help,
    Quit,
}

pub fn parse_line(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    let command = match name {
        "" => ShellCommand::Empty,
        "next" => ShellCommand::Next,
        "prev" => ShellCommand::Prev,
        "reload" => ShellCommand::Reload,
        "more" => ShellCommand::More,
        "discover" => ShellCommand::Discover,
        "save" => ShellCommand::Save,
        "cancel" => ShellCommand::Cancel,
        "help" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        "page" => match rest.parse::<u32>() {
            Ok(page) if page > 0 => ShellCommand::Page(page),
            _ => return Err("использование: page N (N >= 1)".to_string()),
        },
        // Нечисловой id проверяет контроллер поиска.
        "get" => ShellCommand::Get(rest.to_string()),
        "edit" => ShellCommand::Edit(parse_id(rest, "edit")?),
        "delete" => ShellCommand::Delete(parse_id(rest, "delete")?),
        "set" => {
            let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let field = FormField::parse(field)
                .ok_or_else(|| format!("неизвестное поле формы: {field:?}"))?;
            ShellCommand::Set(field, value.trim().to_string())
        }
        "user" if rest.is_empty() => ShellCommand::User(None),
        "user" => ShellCommand::User(Some(rest.to_string())),
        other => return Err(format!("неизвестная команда: {other} (help - список команд)")),
    };
    Ok(command)
}

fn parse_id(raw: &str, command: &str) -> Result<i64, String> {
    raw.parse::<i64>()
        .map_err(|_| format!("использование: {command} ID"))
}

/// Интерактивная сессия поверх stdin. Завершается по `quit` или EOF.
pub async fn run<A: PostsApi>(app: &PixelMindApp<A>) -> Result<()> {
    println!("{HELP}");

    let mut user_rx = app.identity().subscribe();
    tokio::spawn(async move {
        while user_rx.changed().await.is_ok() {
            let user = user_rx.borrow_and_update().clone();
            println!("[user] {user}");
        }
    });

    let (feed, discover) = app.start().await;
    debug!(?feed, ?discover, "initial load finished");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}> ", app.identity().current());
        std::io::stdout().flush().context("failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };
        match parse_line(&line) {
            Ok(ShellCommand::Quit) => break,
            Ok(command) => execute(app, command).await,
            Err(message) => println!("{message}"),
        }
    }

    Ok(())
}

async fn execute<A: PostsApi>(app: &PixelMindApp<A>, command: ShellCommand) {
    match command {
        ShellCommand::Empty | ShellCommand::Quit => {}
        ShellCommand::Next => {
            app.feed.next().await;
        }
        ShellCommand::Prev => {
            if app.feed.prev().await.is_none() {
                println!("это первая страница");
            }
        }
        ShellCommand::Reload => {
            app.feed.reload().await;
        }
        ShellCommand::Page(page) => {
            app.feed.load(page - 1).await;
        }
        ShellCommand::More => {
            app.discover.load_more().await;
        }
        ShellCommand::Discover => {
            app.discover.reload().await;
        }
        ShellCommand::Get(raw) => {
            if app.search.search(&raw).await.is_none() {
                println!("использование: get ID");
            }
        }
        ShellCommand::Edit(id) => {
            if !app.start_edit(id) {
                println!("пост {id} не найден на странице или принадлежит другому пользователю");
                return;
            }
            print_fields(&app.update.snapshot().fields);
        }
        ShellCommand::Set(field, value) => {
            if app.update.editing_id().is_some() {
                let mut fields = app.update.snapshot().fields;
                field.apply(&mut fields, value);
                app.update.set_fields(fields);
            } else {
                let mut fields = app.create.snapshot().fields;
                field.apply(&mut fields, value);
                app.create.set_fields(fields);
            }
        }
        ShellCommand::Save => {
            let status = if app.update.editing_id().is_some() {
                app.submit_update().await
            } else {
                app.submit_create().await
            };
            debug!(?status, "form submitted");
        }
        ShellCommand::Cancel => app.update.cancel(),
        ShellCommand::Delete(id) => {
            if let Outcome::Ok(()) = app.delete_post(id).await {
                debug!(id, "post removed from shell");
            }
        }
        ShellCommand::User(None) => println!("пользователь: {}", app.identity().current()),
        ShellCommand::User(Some(name)) => {
            if let Err(err) = app.switch_user(&name).await {
                println!("не удалось сохранить пользователя: {err}");
            }
        }
        ShellCommand::Help => println!("{HELP}"),
    }
}

fn print_fields(fields: &FormFields) {
    println!("  title: {}", fields.title);
    println!("  image: {}", fields.image);
    println!("  url: {}", fields.url);
    println!("  description: {}", fields.description);
    println!("  tags: {}", fields.tags);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_line_reads_simple_commands() {
        assert_eq!(parse_line("  next "), Ok(ShellCommand::Next));
        assert_eq!(parse_line("exit"), Ok(ShellCommand::Quit));
        assert_eq!(parse_line(""), Ok(ShellCommand::Empty));
    }

    #[test]
    fn parse_line_page_is_one_based() {
        assert_eq!(parse_line("page 3"), Ok(ShellCommand::Page(3)));
        assert!(parse_line("page 0").is_err());
        assert!(parse_line("page").is_err());
    }

    #[test]
    fn parse_line_keeps_raw_search_input() {
        assert_eq!(parse_line("get abc"), Ok(ShellCommand::Get("abc".to_string())));
        assert_eq!(parse_line("get"), Ok(ShellCommand::Get(String::new())));
    }

    #[test]
    fn parse_line_requires_numeric_id_for_edit_and_delete() {
        assert_eq!(parse_line("edit 4"), Ok(ShellCommand::Edit(4)));
        assert_eq!(parse_line("delete 9"), Ok(ShellCommand::Delete(9)));
        assert_eq!(parse_line("delete x"), Err("использование: delete ID".to_string()));
    }

    #[test]
    fn parse_line_set_keeps_spaces_in_value() {
        assert_eq!(
            parse_line("set title Café y estudio"),
            Ok(ShellCommand::Set(FormField::Title, "Café y estudio".to_string()))
        );
        assert_eq!(
            parse_line("set tags"),
            Ok(ShellCommand::Set(FormField::Tags, String::new()))
        );
        assert!(parse_line("set colour red").is_err());
    }

    #[test]
    fn parse_line_user_with_and_without_name() {
        assert_eq!(parse_line("user"), Ok(ShellCommand::User(None)));
        assert_eq!(
            parse_line("user  tania "),
            Ok(ShellCommand::User(Some("tania".to_string())))
        );
    }

    #[test]
    fn parse_line_rejects_unknown_command() {
        let err = parse_line("dance").unwrap_err();
        assert!(err.contains("dance"));
    }

    #[test]
    fn form_field_apply_targets_one_field() {
        let mut fields = FormFields::default();
        FormField::Image.apply(&mut fields, "a.jpg".to_string());

        assert_eq!(fields.image, "a.jpg");
        assert!(fields.title.is_empty());
    }
}
