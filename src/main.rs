use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use toolscout::backend::HttpBackend;
use toolscout::config::WizardConfig;
use toolscout::error::Error;
use toolscout::reconcile::HttpSessionFeed;
use toolscout::store::{LibSqlStore, SessionStore};
use toolscout::wizard::{Step, WizardController, loading_message};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let mut config = WizardConfig::default();
    if let Ok(url) = std::env::var("TOOLSCOUT_BACKEND_URL") {
        config.backend_url = url;
    }
    if let Ok(url) = std::env::var("TOOLSCOUT_FEED_URL") {
        config.feed_url = url;
    }
    if let Ok(secs) = std::env::var("TOOLSCOUT_POLL_SECS") {
        if let Ok(secs) = secs.parse() {
            config.poll_interval = std::time::Duration::from_secs(secs);
        }
    }

    let db_path =
        std::env::var("TOOLSCOUT_DB_PATH").unwrap_or_else(|_| "./data/toolscout.db".to_string());

    let store: Arc<dyn SessionStore> = Arc::new(
        LibSqlStore::new_local(std::path::Path::new(&db_path))
            .await
            .unwrap_or_else(|e| {
                eprintln!("Error: Failed to open database at {db_path}: {e}");
                std::process::exit(1);
            }),
    );

    let backend = Arc::new(HttpBackend::new(config.backend_url.clone()));
    let feed = Arc::new(HttpSessionFeed::new(config.feed_url.clone()));
    let controller = Arc::new(WizardController::new(config.clone(), store, backend, feed));

    eprintln!("🔎 toolscout v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", config.backend_url);
    eprintln!();

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        match controller.step().await {
            Step::Problem => run_problem_step(&controller, &mut lines).await,
            Step::Details => {
                run_details_step(&controller, &mut lines, config.loading_rotation).await
            }
            Step::Recommendations => run_recommendations_step(&controller, &mut lines).await,
            Step::Feedback => run_feedback_step(&controller, &mut lines).await,
            Step::Booking => run_booking_step(&controller, &mut lines).await,
            Step::Done => {
                println!("\n🎉 All done — thanks for trying toolscout!");
                return Ok(());
            }
        }
    }
}

async fn read_line(lines: &mut Lines<BufReader<Stdin>>, prompt: &str) -> String {
    eprint!("{prompt}");
    match lines.next_line().await {
        Ok(Some(line)) => line.trim().to_string(),
        _ => {
            // EOF, nothing more to do interactively.
            std::process::exit(0);
        }
    }
}

async fn run_problem_step(controller: &WizardController, lines: &mut Lines<BufReader<Stdin>>) {
    println!("\n💡 Step 1 of 6 — What problem are you trying to solve?");
    let problem = read_line(lines, "> ").await;
    controller.set_problem(&problem).await;
    if let Err(e) = controller.advance_from_problem().await {
        println!("⚠️  {e}");
    }
}

async fn run_details_step(
    controller: &Arc<WizardController>,
    lines: &mut Lines<BufReader<Stdin>>,
    rotation_period: std::time::Duration,
) {
    println!("\n📩 Step 2 of 6 — Your details");
    let name = read_line(lines, "Name: ").await;
    let email = read_line(lines, "Email: ").await;
    let company_size = read_line(lines, "Company size (Solo/SMB/Mid/Enterprise): ").await;
    let budget = read_line(lines, "Budget (optional): ").await;
    let budget = budget.parse::<f64>().ok();
    controller.set_details(&name, &email, &company_size, budget).await;

    // Cosmetic status rotation while the call is in flight.
    let rotation = controller_rotation(controller, rotation_period);

    let result = controller.generate_recommendations().await;
    rotation.abort();

    match result {
        Ok(()) => {}
        Err(Error::Backend(e)) => println!("⚠️  Could not generate recommendations: {e}"),
        Err(e) => println!("⚠️  {e}"),
    }
}

fn controller_rotation(
    controller: &Arc<WizardController>,
    period: std::time::Duration,
) -> tokio::task::JoinHandle<()> {
    let controller = Arc::clone(controller);
    tokio::spawn(async move {
        let tick = AtomicUsize::new(0);
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if controller.is_loading() {
                let n = tick.fetch_add(1, Ordering::Relaxed);
                eprintln!("✨ {}", loading_message(n));
            }
        }
    })
}

async fn run_recommendations_step(
    controller: &WizardController,
    lines: &mut Lines<BufReader<Stdin>>,
) {
    let view = controller.recommendation_view().await;

    if !view.ready {
        println!("\n✨ Generating your personalized recommendations...");
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        return;
    }

    println!("\n🤖 Step 3 of 6 — Your recommendations\n");
    for block in &view.blocks {
        println!("{block}\n");
    }
    println!("Which tools would you like to explore further?");
    for (i, name) in view.names.iter().enumerate() {
        let mark = if view.selected.iter().any(|s| s == name) {
            "[x]"
        } else {
            "[ ]"
        };
        println!("  {} {mark} {name}", i + 1);
    }

    let input = read_line(lines, "Toggle a number, or 'next' / 'back': ").await;
    match input.as_str() {
        "next" => {
            if let Err(e) = controller.advance_from_recommendations().await {
                println!("⚠️  {e}");
            }
        }
        "back" => {
            if let Err(e) = controller.back().await {
                println!("⚠️  {e}");
            }
        }
        other => {
            if let Ok(n) = other.parse::<usize>() {
                if let Some(name) = view.names.get(n.saturating_sub(1)) {
                    controller.toggle_tool(name).await;
                }
            }
        }
    }
}

async fn run_feedback_step(controller: &WizardController, lines: &mut Lines<BufReader<Stdin>>) {
    println!(
        "\n⭐ Step 4 of 6 — Your feedback (selected: {})",
        controller.selected_tools().await.join(", ")
    );
    let rating = read_line(lines, "Rating 1-5: ").await.parse::<u8>().unwrap_or(0);
    let comment = read_line(lines, "Comments: ").await;

    match controller.submit_feedback(rating, &comment).await {
        Ok(_) => {}
        Err(Error::Wizard(e)) => println!("⚠️  {e}"),
        Err(e) => println!("⚠️  Could not submit feedback: {e}"),
    }
}

async fn run_booking_step(controller: &WizardController, lines: &mut Lines<BufReader<Stdin>>) {
    println!("\n📅 Step 5 of 6 — Book your consultation");
    println!("Open this link to book: {}", controller.booking_url());
    let input = read_line(lines, "Press Enter to continue (or 'back'): ").await;
    if input == "back" {
        if let Err(e) = controller.back().await {
            println!("⚠️  {e}");
        }
        return;
    }
    if let Err(e) = controller.finish_booking().await {
        println!("⚠️  {e}");
    }
}
