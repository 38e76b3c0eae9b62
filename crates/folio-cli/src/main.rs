//! Folio CLI: the editing surface of the studio site.
//!
//! Reads configuration from the environment (FOLIO_STORE_BACKEND, FIRESTORE_PROJECT_ID,
//! FIREBASE_API_KEY, FOLIO_UPLOAD_URL, ...). Editing commands sign in first with
//! FOLIO_EMAIL and FOLIO_PASSWORD.

use anyhow::Context;
use clap::{Parser, Subcommand};
use folio_cli::{ensure_succeeded, init_tracing, print_json, status_line};
use folio_core::models::Category;
use folio_core::Config;
use folio_services::{AuthProvider, Catalog, Editor, FirebaseAuth, StaticAuth, UploadTarget};
use folio_store::{create_store, DocumentStore, StoreBackend};
use folio_upload::{load_file, UploadClient};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "folio", about = "Studio site editing CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the editor credentials from FOLIO_EMAIL / FOLIO_PASSWORD
    Login,
    /// Send a password reset email
    ResetPassword {
        email: String,
    },
    /// Landing slideshow
    Slideshow {
        #[command(subcommand)]
        sub: SlideshowCommands,
    },
    /// Finished projects
    Project {
        #[command(subcommand)]
        sub: ProjectCommands,
    },
    /// Proposed projects
    Proposed {
        #[command(subcommand)]
        sub: ProposedCommands,
    },
    /// Show the featured project (by title, falling back to the first project)
    Featured {
        title: String,
    },
}

#[derive(Subcommand)]
enum SlideshowCommands {
    /// Print the published images in display order
    Show,
    /// Upload images and append them to the slideshow
    Add {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Remove the image at a position (0-based)
    Remove {
        index: usize,
    },
    /// Move an image from one position to another (0-based)
    Move {
        from: usize,
        to: usize,
    },
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// Add a finished project
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        location: String,
        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,
        #[arg(long, default_value = "Residential")]
        category: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        approach: String,
        #[arg(long, default_value = "")]
        catchline: String,
        /// Images to upload and attach
        images: Vec<PathBuf>,
    },
    /// List projects, grouped by category
    List,
    /// Show one project by title
    Show {
        title: String,
    },
}

#[derive(Subcommand)]
enum ProposedCommands {
    /// Add a proposed project
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "Residential")]
        category: String,
        images: Vec<PathBuf>,
    },
    /// List proposed projects in a category
    List {
        #[arg(long, default_value = "Residential")]
        category: Category,
    },
}

fn build_auth(config: &Config) -> anyhow::Result<Arc<dyn AuthProvider>> {
    match config.store_backend {
        StoreBackend::Firestore => Ok(Arc::new(
            FirebaseAuth::from_config(config).context("Failed to create auth client")?,
        )),
        StoreBackend::Memory => {
            let mut auth = StaticAuth::new();
            if let (Some(email), Some(password)) = (&config.editor_email, &config.editor_password)
            {
                auth = auth.with_account(email.clone(), password.clone());
            }
            Ok(Arc::new(auth))
        }
    }
}

async fn signed_in_editor(
    config: &Config,
    store: Arc<dyn DocumentStore>,
) -> anyhow::Result<Editor> {
    let uploads = UploadClient::from_config(config).context("Failed to create upload client")?;
    let mut editor = Editor::new(store, Arc::new(uploads), build_auth(config)?, config);

    let email = config
        .editor_email
        .as_deref()
        .context("FOLIO_EMAIL must be set for editing commands")?;
    let password = config
        .editor_password
        .as_deref()
        .context("FOLIO_PASSWORD must be set for editing commands")?;

    editor.sign_in(email, password).await;
    ensure_succeeded("Sign-in", editor.sign_in_status())?;
    Ok(editor)
}

async fn load_files(paths: &[PathBuf]) -> anyhow::Result<Vec<folio_core::models::FileHandle>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(load_file(path).await?);
    }
    Ok(files)
}

/// Load the slideshow, refusing to edit a gallery that could not be read
async fn load_slideshow(editor: &mut Editor) -> anyhow::Result<()> {
    editor.load_gallery().await;
    if let Some(reason) = editor.gallery().load_error() {
        anyhow::bail!("{}", reason);
    }
    if let Some(warning) = editor.gallery().warning() {
        eprintln!("{}", warning);
    }
    Ok(())
}

fn report_failed_uploads(batch: &folio_core::models::UploadBatch) {
    for upload in batch.failed() {
        eprintln!(
            "{}: {}",
            upload.file().name(),
            upload.error().unwrap_or("Upload failed")
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;
    let store = create_store(&config).context("Failed to create document store")?;
    tracing::debug!(backend = ?store.backend_type(), "Document store ready");
    let cli = Cli::parse();

    match cli.command {
        Commands::Login => {
            let editor = signed_in_editor(&config, store).await?;
            println!("{}", status_line("Sign-in", editor.sign_in_status()));
            if let Some(session) = editor.session().current() {
                print_json(&serde_json::json!({
                    "email": session.email,
                    "expires_at": session.expires_at,
                }))?;
            }
        }
        Commands::ResetPassword { email } => {
            let uploads = UploadClient::from_config(&config)?;
            let mut editor = Editor::new(store, Arc::new(uploads), build_auth(&config)?, &config);
            editor.send_password_reset(&email).await;
            ensure_succeeded("Password reset", editor.reset_status())?;
            println!("{}", status_line("Password reset", editor.reset_status()));
        }
        Commands::Slideshow { sub } => match sub {
            SlideshowCommands::Show => {
                let images = Catalog::new(store).landing_images().await?;
                print_json(&images)?;
            }
            SlideshowCommands::Add { files } => {
                let mut editor = signed_in_editor(&config, store).await?;
                load_slideshow(&mut editor).await?;
                let selection = editor.select_files(UploadTarget::Slideshow, load_files(&files).await?);
                if let Some(warning) = editor.gallery().warning() {
                    eprintln!("{}", warning);
                }
                if selection.accepted.is_empty() {
                    return Ok(());
                }
                editor.settle_uploads().await;
                report_failed_uploads(editor.gallery().uploads());
                editor.save_gallery().await.ok();
                ensure_succeeded("Save", editor.gallery_status())?;
                println!("{}", status_line("Save", editor.gallery_status()));
                print_json(&editor.gallery().published())?;
            }
            SlideshowCommands::Remove { index } => {
                let mut editor = signed_in_editor(&config, store).await?;
                load_slideshow(&mut editor).await?;
                let removed = editor
                    .gallery_mut()
                    .remove(index)
                    .with_context(|| format!("No image at position {}", index))?;
                editor.save_gallery().await.ok();
                ensure_succeeded("Save", editor.gallery_status())?;
                println!("Removed {}", removed);
            }
            SlideshowCommands::Move { from, to } => {
                let mut editor = signed_in_editor(&config, store).await?;
                load_slideshow(&mut editor).await?;
                editor.gallery_mut().begin_reorder(from);
                if !editor.gallery_mut().complete_reorder(to) {
                    anyhow::bail!("Nothing to move from {} to {}", from, to);
                }
                editor.save_gallery().await.ok();
                ensure_succeeded("Save", editor.gallery_status())?;
                print_json(&editor.gallery().published())?;
            }
        },
        Commands::Project { sub } => match sub {
            ProjectCommands::Add {
                title,
                location,
                tags,
                category,
                description,
                approach,
                catchline,
                images,
            } => {
                let mut editor = signed_in_editor(&config, store).await?;
                {
                    let form = editor.project_form_mut();
                    form.title = title;
                    form.location = location;
                    form.tags = tags;
                    form.category = category;
                    form.description = description;
                    form.approach = approach;
                    form.catchline = catchline;
                }
                editor.select_files(UploadTarget::Project, load_files(&images).await?);
                editor.settle_uploads().await;
                report_failed_uploads(&editor.project_form().uploads);

                let result = editor.submit_project().await;
                ensure_succeeded("Project", editor.project_status())?;
                println!("{}", status_line("Project", editor.project_status()));
                if let Ok(id) = result {
                    print_json(&serde_json::json!({ "id": id }))?;
                }
            }
            ProjectCommands::List => {
                let groups = Catalog::new(store).projects_by_category().await?;
                print_json(&groups)?;
            }
            ProjectCommands::Show { title } => {
                let project = Catalog::new(store)
                    .find_project(&title)
                    .await?
                    .with_context(|| format!("No project titled {}", title))?;
                print_json(&project)?;
            }
        },
        Commands::Proposed { sub } => match sub {
            ProposedCommands::Add {
                title,
                category,
                images,
            } => {
                let mut editor = signed_in_editor(&config, store).await?;
                editor.proposed_form_mut().title = title;
                editor.proposed_form_mut().category = category;
                editor.select_files(UploadTarget::Proposed, load_files(&images).await?);
                editor.settle_uploads().await;
                report_failed_uploads(&editor.proposed_form().uploads);

                let result = editor.submit_proposed().await;
                ensure_succeeded("Proposed project", editor.proposed_status())?;
                println!("{}", status_line("Proposed project", editor.proposed_status()));
                if let Ok(id) = result {
                    print_json(&serde_json::json!({ "id": id }))?;
                }
            }
            ProposedCommands::List { category } => {
                let projects = Catalog::new(store).proposed_in(category).await?;
                print_json(&projects)?;
            }
        },
        Commands::Featured { title } => {
            let project = Catalog::new(store).featured_project(&title).await?;
            print_json(&project)?;
        }
    }

    Ok(())
}
