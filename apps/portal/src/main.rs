use anyhow::{bail, Context, Result};
use bytes::Bytes;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use portal::api::ApiClient;
use portal::chat::overlay::{ChatOverlay, OVERLAY_ID};
use portal::config::Config;
use portal::documents::{DocumentsView, ProjectsView};
use portal::models::document::{DocType, Document, FileUpload, NewProject};
use portal::models::jobs::JobMatchRequest;
use portal::models::profile::Profile;
use portal::profile::{ProfileCache, ProfileService};
use portal::store::KvStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "portal v{} — backend at {}",
        env!("CARGO_PKG_VERSION"),
        config.api_base
    );

    let client = ApiClient::new(&config);
    let store = KvStore::open(&config.storage_dir)?;

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let mut argv = argv.iter().map(String::as_str);

    match argv.next() {
        Some("docs") => run_docs(client, argv.collect()).await,
        Some("projects") => run_projects(client, argv.collect()).await,
        Some("profile") => run_profile(client, store, argv.collect()).await,
        Some("jobs") => run_jobs(client, argv.collect()).await,
        Some("chat") => run_chat(client, store, argv.collect()).await,
        _ => {
            print_usage();
            Ok(())
        }
    }
}

async fn run_docs(client: ApiClient, args: Vec<&str>) -> Result<()> {
    match args.as_slice() {
        [] | ["list"] => {
            let mut view = DocumentsView::all(client);
            view.refresh().await?;
            print_documents(view.documents());
            Ok(())
        }
        ["list", doc_type] => {
            let doc_type: DocType = doc_type.parse()?;
            let mut view = DocumentsView::typed(client, doc_type.as_str());
            view.refresh().await?;
            print_documents(view.documents());
            Ok(())
        }
        ["upload", path] => upload_file(client, path, DocType::Cv).await,
        ["upload", path, doc_type] => upload_file(client, path, doc_type.parse()?).await,
        ["rename", id, title] => {
            let id: i64 = id.parse().context("ID must be an integer")?;
            let mut view = DocumentsView::all(client);
            view.refresh().await?;
            if view.rename(id, title).await? {
                println!("Renamed #{id} to '{}'", title.trim());
            } else {
                println!("Rename was not applied");
            }
            Ok(())
        }
        ["delete", id] => {
            let id: i64 = id.parse().context("ID must be an integer")?;
            let mut view = DocumentsView::all(client);
            view.refresh().await?;
            if view.delete(id).await? {
                println!("Deleted #{id}");
            } else {
                println!("Delete was not applied");
            }
            Ok(())
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

async fn upload_file(client: ApiClient, path: &str, doc_type: DocType) -> Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read {path}"))?;
    let file_name = std::path::Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .context("path has no file name")?
        .to_owned();

    let mut view = DocumentsView::all(client);
    let created = view
        .upload(FileUpload::new(file_name, Bytes::from(bytes), doc_type))
        .await?;
    println!("Uploaded: {} (#{})", created.label(), created.id);
    Ok(())
}

async fn run_projects(client: ApiClient, args: Vec<&str>) -> Result<()> {
    match args.as_slice() {
        [] | ["list"] => {
            let mut view = ProjectsView::new(client);
            view.refresh().await?;
            if view.projects().is_empty() {
                println!("No projects yet.");
            }
            for project in view.projects() {
                println!(
                    "#{} {} — {}",
                    project.id,
                    project.label(),
                    project.link().unwrap_or("-")
                );
                if let Some(description) = project.description.as_deref() {
                    if !description.is_empty() {
                        println!("    {description}");
                    }
                }
            }
            Ok(())
        }
        ["add", title, url] => add_project(client, title, url, "").await,
        ["add", title, url, description] => add_project(client, title, url, description).await,
        _ => {
            print_usage();
            Ok(())
        }
    }
}

async fn add_project(client: ApiClient, title: &str, url: &str, description: &str) -> Result<()> {
    let mut view = ProjectsView::new(client);
    let created = view
        .add(&NewProject::new(title, url, description))
        .await?;
    println!("Added project: {} (#{})", created.label(), created.id);
    Ok(())
}

async fn run_profile(client: ApiClient, store: KvStore, args: Vec<&str>) -> Result<()> {
    let service = ProfileService::new(client, ProfileCache::new(store));
    let profile = match args.as_slice() {
        ["--regenerate"] => {
            service.invalidate()?;
            service.generate().await?
        }
        [] => service.get_or_generate().await?,
        _ => {
            print_usage();
            return Ok(());
        }
    };
    print_profile(&profile);
    Ok(())
}

async fn run_jobs(client: ApiClient, args: Vec<&str>) -> Result<()> {
    let mut request = JobMatchRequest::default();
    let mut args = args.into_iter();
    while let Some(flag) = args.next() {
        match flag {
            "--role" => request.override_role = args.next().map(str::to_owned),
            "--location" => request.override_location = args.next().map(str::to_owned),
            "--cookie" => request.cookie = args.next().map(str::to_owned),
            other => bail!("unknown jobs flag '{other}'"),
        }
    }

    let matched = client.match_jobs(&request).await?;
    println!(
        "{} @ {} — {} match(es)",
        matched.role,
        matched.location,
        matched.jobs.len()
    );
    for job in &matched.jobs {
        println!(
            "  {} — {} ({})",
            job.title,
            job.company.as_deref().filter(|c| !c.is_empty()).unwrap_or("?"),
            job.url
        );
    }
    Ok(())
}

async fn run_chat(client: ApiClient, store: KvStore, args: Vec<&str>) -> Result<()> {
    let message = args.join(" ");
    let overlay = ChatOverlay::acquire(OVERLAY_ID, client, store);
    overlay.set_open(true)?;

    let mut session = overlay.session().lock().await;
    let reply = session.send(&message).await?;
    println!("{reply}");
    Ok(())
}

fn print_documents(documents: &[Document]) {
    if documents.is_empty() {
        println!("No documents yet.");
        return;
    }
    for doc in documents {
        let size = doc
            .size_bytes
            .map(|bytes| format!("{bytes} bytes"))
            .unwrap_or_else(|| "-".to_owned());
        let uploaded = doc
            .uploaded_at
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "-".to_owned());
        println!(
            "#{} [{}] {} · {size} · {uploaded}",
            doc.id,
            doc.doc_type,
            doc.label()
        );
        if let Some(link) = doc.link() {
            println!("    {link}");
        }
    }
}

fn print_profile(profile: &Profile) {
    println!("{}", profile.name.as_deref().unwrap_or("Your Name"));
    println!("{}", profile.title.as_deref().unwrap_or("Job Title"));
    if let Some(summary) = profile.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        println!("\nAbout\n  {summary}");
    }
    if !profile.skills.is_empty() {
        println!("\nSkills\n  {}", profile.skills.join(", "));
    }
    if !profile.experience.is_empty() {
        println!("\nExperience");
        for entry in &profile.experience {
            let range = date_range(entry.start.as_deref(), entry.end.as_deref());
            println!("  {} — {}{range}", entry.company, entry.role);
            for bullet in &entry.bullets {
                println!("    • {bullet}");
            }
        }
    }
    if !profile.education.is_empty() {
        println!("\nEducation");
        for entry in &profile.education {
            let range = date_range(entry.start.as_deref(), entry.end.as_deref());
            println!("  {} — {}{range}", entry.school, entry.degree);
        }
    }
    let links = &profile.links;
    if links.linkedin.is_some() || links.github.is_some() || links.website.is_some() {
        println!("\nLinks");
        if let Some(linkedin) = links.linkedin.as_deref() {
            println!("  LinkedIn: {linkedin}");
        }
        if let Some(github) = links.github.as_deref() {
            println!("  GitHub: {github}");
        }
        if let Some(website) = links.website.as_deref() {
            println!("  Portfolio: {website}");
        }
    }
    if let Some(email) = profile.email.as_deref() {
        println!("\nContact: {email}");
    }
}

fn date_range(start: Option<&str>, end: Option<&str>) -> String {
    match (start, end) {
        (None, None) => String::new(),
        (start, end) => format!(
            " ({}{})",
            start.unwrap_or(""),
            end.map(|e| format!(" – {e}")).unwrap_or_default()
        ),
    }
}

fn print_usage() {
    eprintln!(
        "Usage:
  portal docs list [TYPE]
  portal docs upload <PATH> [TYPE]
  portal docs rename <ID> <TITLE>
  portal docs delete <ID>
  portal projects [list]
  portal projects add <TITLE> <URL> [DESCRIPTION]
  portal profile [--regenerate]
  portal jobs [--role R] [--location L] [--cookie C]
  portal chat <MESSAGE>...

Types: CV, CERTIFICATE, RECOMMENDATION, PROFILE_IMAGE, PROJECT, OTHER"
    );
}
