// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! bricks - command line front end for portfolio projects
//!
//! Every command opens one project from the configured storage root,
//! applies a single edit and saves it back.

use anyhow::{bail, Context, Result};
use portfolio_bricks::config::{self, EditorConfig, CONFIG_FILE};
use portfolio_bricks::io::{serialization, DirPhotoStore, JsonFileGateway, PersistenceGateway};
use portfolio_bricks::{
    DocumentEditor, EditorContext, GeoLocation, PhotoTarget, ProjectId, TemplateKind,
};
use std::path::PathBuf;
use std::sync::Arc;

const HELP: &str = "\
bricks - portfolio page builder

USAGE:
  bricks [OPTIONS] <COMMAND> [ARGS]

OPTIONS:
  --config <FILE>    Config file (default: bricks.yaml)
  --user <ID>        Owner id (default: $USER)
  --author <NAME>    Author name for new projects
  -h, --help         Print help

COMMANDS:
  list                              List your projects, newest first
  show <ID>                         Print a project's blocks
  import <FILE>                     Store a project from .json or .yaml
  export <ID> <FILE>                Write a project to .json or .yaml
  add <ID|new> <TEMPLATE> [--title T] [--text T]
                                    Append a block
  text <ID> <BLOCK> <FIELD> <VALUE> Replace a text field
  photo <ID> <cover|BLOCK:SLOT> <IMAGE> [--zoom Z] [--rotate DEG]
                                    Crop an image into a photo slot
  move <ID> <FROM> <TO>             Move a block
  delete <ID> <BLOCK>               Delete a block
  locate <ID> <LAT> <LNG>           Pin the map location

TEMPLATES:
  text-panel, feature-photo, photo-triptych, full-bleed, photo-grid,
  map-with-pin (or their index 0-5)
";

struct Cli {
    config: EditorConfig,
    user: String,
    author: String,
}

impl Cli {
    fn context(&self) -> EditorContext {
        let gateway = Arc::new(JsonFileGateway::new(self.config.projects_dir()));
        let photos = Arc::new(DirPhotoStore::new(self.config.photos_dir()));
        EditorContext::new(self.user.clone(), self.author.clone(), gateway, photos)
            .with_config(self.config.clone())
    }

    fn gateway(&self) -> JsonFileGateway {
        JsonFileGateway::new(self.config.projects_dir())
    }

    async fn open(&self, id: &str) -> Result<DocumentEditor> {
        DocumentEditor::open(self.context(), &ProjectId::from(id))
            .await
            .with_context(|| format!("Failed to open project {id}"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let config_path: PathBuf = args
        .opt_value_from_str("--config")?
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let cli = Cli {
        config: config::load_or_default(&config_path)?,
        user: args
            .opt_value_from_str("--user")?
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_else(|| "local".to_string()),
        author: args.opt_value_from_str("--author")?.unwrap_or_default(),
    };

    let Some(command) = args.subcommand()? else {
        print!("{HELP}");
        return Ok(());
    };

    match command.as_str() {
        "list" => list(&cli).await?,
        "show" => {
            let id: String = args.free_from_str()?;
            show(&cli.open(&id).await?);
        }
        "import" => {
            let path: PathBuf = args.free_from_str()?;
            let project = serialization::import(&path)?;
            let mut editor = DocumentEditor::from_project(cli.context(), project);
            let saved = editor.save().await?;
            println!("{}", saved.id);
        }
        "export" => {
            let id: String = args.free_from_str()?;
            let path: PathBuf = args.free_from_str()?;
            serialization::export(cli.open(&id).await?.project(), &path)?;
        }
        "add" => {
            let title: Option<String> = args.opt_value_from_str("--title")?;
            let text: Option<String> = args.opt_value_from_str("--text")?;
            let id: String = args.free_from_str()?;
            let template: TemplateKind = args.free_from_str()?;

            let mut editor = if id == "new" {
                DocumentEditor::new(cli.context())
            } else {
                cli.open(&id).await?
            };
            if let Some(title) = title {
                editor.set_title(title);
            }
            let key = editor.add_block(template);
            if let Some(text) = text {
                let index = editor.pages().len() - 1;
                editor.set_block_text(index, 0, text);
            }
            let saved = editor.save().await?;
            println!("{} {}", saved.id, key);
        }
        "text" => {
            let id: String = args.free_from_str()?;
            let block: usize = args.free_from_str()?;
            let field: usize = args.free_from_str()?;
            let value: String = args.free_from_str()?;
            let mut editor = cli.open(&id).await?;
            editor.set_block_text(block, field, value);
            editor.save().await?;
        }
        "photo" => {
            let zoom: Option<f64> = args.opt_value_from_str("--zoom")?;
            let rotate: Option<f64> = args.opt_value_from_str("--rotate")?;
            let id: String = args.free_from_str()?;
            let target: String = args.free_from_str()?;
            let image: PathBuf = args.free_from_str()?;

            let mut editor = cli.open(&id).await?;
            let target = parse_target(&editor, &target)?;
            let mut session = editor
                .begin_photo(&target)
                .context("No such photo slot")?;
            let bytes = tokio::fs::read(&image)
                .await
                .with_context(|| format!("Failed to read {}", image.display()))?;
            session.load_from_file(bytes).await?;
            if let Some(zoom) = zoom {
                session.update_zoom(zoom);
            }
            if let Some(rotate) = rotate {
                session.update_rotation(rotate);
            }
            let photo = session.commit().await?;
            let url = editor.complete_photo(&target, photo).await?;
            editor.save().await?;
            println!("{url}");
        }
        "move" => {
            let id: String = args.free_from_str()?;
            let from: usize = args.free_from_str()?;
            let to: usize = args.free_from_str()?;
            let mut editor = cli.open(&id).await?;
            editor.reorder(from, Some(to));
            editor.save().await?;
        }
        "delete" => {
            let id: String = args.free_from_str()?;
            let block: usize = args.free_from_str()?;
            let mut editor = cli.open(&id).await?;
            editor.delete_block(block);
            editor.save().await?;
        }
        "locate" => {
            let id: String = args.free_from_str()?;
            let lat: f64 = args.free_from_str()?;
            let lng: f64 = args.free_from_str()?;
            let mut editor = cli.open(&id).await?;
            editor.sync_map_location(GeoLocation::new(lat, lng));
            editor.save().await?;
        }
        other => bail!("Unknown command: {other}\n\n{HELP}"),
    }

    let rest = args.finish();
    if !rest.is_empty() {
        log::warn!("Ignoring extra arguments: {:?}", rest);
    }
    Ok(())
}

async fn list(cli: &Cli) -> Result<()> {
    for summary in cli.gateway().list_by_owner(&cli.user).await? {
        let modified = summary
            .last_modified
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{}  {}  {}", summary.id, modified, summary.title);
    }
    Ok(())
}

fn show(editor: &DocumentEditor) {
    let project = editor.project();
    println!("{} \"{}\" by {}", project.id, project.title, project.author_name);
    if !project.cover_image_url.is_empty() {
        println!("cover: {}", project.cover_image_url);
    }
    for (index, block) in editor.pages().iter().enumerate() {
        println!("[{index}] {} ({})", block.template(), block.key());
        for text in block.text().unwrap_or_default() {
            println!("    text: {text}");
        }
        for (slot, url) in block.photos().unwrap_or_default().iter().enumerate() {
            println!("    photo {slot}: {url}");
        }
        if let Some(location) = block.location() {
            match (location.lat, location.lng) {
                (Some(lat), Some(lng)) => println!("    pin: {lat}, {lng}"),
                _ => println!("    pin: unset"),
            }
        }
    }
}

/// `cover` or `<block>:<slot>`.
fn parse_target(editor: &DocumentEditor, target: &str) -> Result<PhotoTarget> {
    if target == "cover" {
        return Ok(PhotoTarget::Cover);
    }
    let Some((block, slot)) = target.split_once(':') else {
        bail!("Photo target must be `cover` or BLOCK:SLOT, got {target}");
    };
    let block: usize = block.parse().context("Invalid block index")?;
    let slot: usize = slot.parse().context("Invalid slot index")?;
    let key = editor
        .block(block)
        .map(|b| b.key().clone())
        .with_context(|| format!("No block at index {block}"))?;
    Ok(PhotoTarget::Slot { key, slot })
}
