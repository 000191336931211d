//! Dashboard walkthrough over the bundled fixtures.
//!
//! Reads `TASKDESK_*` settings from the environment (or a `.env` file), for
//! example `TASKDESK_LATENCY_MS=dashboard` to simulate the API delays.

use rust_decimal::Decimal;
use std::sync::Arc;
use taskdesk::billing::round_for_display;
use taskdesk::models::{NewInvoice, NewLineItem, NewPayment, Task, TaskStatus};
use taskdesk::observability::LogMetrics;
use taskdesk::views::{plan_move, BoardMove, DropTarget, KanbanBoard, ViewCache};
use taskdesk::{Command, Config, CrudService, InMemoryBackend, Result, Workspace};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init()
        .ok();

    println!("\n=== taskdesk - Dashboard Example ===\n");

    // 1. Build the workspace
    println!("1. Opening workspace...");
    let config = Config::from_env()?;
    let workspace = Workspace::with_metrics(InMemoryBackend::new(), config, Arc::new(LogMetrics));
    let seeded = workspace.seed_fixtures().await?;
    println!("   ✓ Loaded {} fixture records\n", seeded.total());

    // 2. First paint
    println!("2. Loading the dashboard:");
    let snapshot = workspace.load_dashboard().await?;
    println!(
        "   ✓ {} tasks, {} projects, {} clients, {} invoices",
        snapshot.tasks.len(),
        snapshot.projects.len(),
        snapshot.clients.len(),
        snapshot.invoices.len()
    );
    println!("   ✓ Urgent: {:?}\n", snapshot.urgent_task_ids);

    // 3. Kanban drop
    println!("3. Dragging task-3 to Done:");
    let mut tasks: ViewCache<Task> = ViewCache::new();
    workspace
        .execute(workspace.tasks(), Command::Refresh, &mut tasks)
        .await?;
    let mut board = KanbanBoard::from_tasks(tasks.items());

    if let Some(source) = board.locate("task-3") {
        let mv = BoardMove {
            task_id: "task-3".to_string(),
            source,
            destination: Some(DropTarget::new("done", 0)),
        };
        if let Some(change) = plan_move(&board, &mv) {
            let task = workspace
                .tasks()
                .set_status(&change.task_id, change.status)
                .await?;
            if let Some(destination) = &mv.destination {
                board.move_task(&task.id, destination);
            }
            println!("   ✓ {} is now {}\n", task.title, task.status);
        }
    }
    let done = board
        .column(TaskStatus::Complete)
        .map_or(0, |column| column.task_ids.len());
    println!("   Done column holds {} task(s)\n", done);

    // 4. Billing
    println!("4. Issuing and paying an invoice:");
    let invoice = workspace
        .invoices()
        .create(NewInvoice {
            client_id: "client-2".into(),
            client_name: "Fernweh Reisen".into(),
            client_email: "lukas@fernweh.test".into(),
            items: vec![
                NewLineItem::new("Illustrations", Decimal::from(6), Decimal::new(18_750, 2)),
                NewLineItem::new("Print setup", Decimal::ONE, Decimal::from(240)),
            ],
            tax_rate: Decimal::new(75, 1),
            discount_rate: Decimal::from(10),
            ..Default::default()
        })
        .await?;
    println!(
        "   ✓ {} total {} due {}",
        invoice.number,
        round_for_display(invoice.total),
        invoice.due_date
    );

    let invoice = workspace
        .invoices()
        .add_payment(&invoice.id, NewPayment::of(Decimal::from(500)))
        .await?;
    println!(
        "   ✓ Paid 500, {} still due ({})\n",
        round_for_display(invoice.amount_due),
        invoice.status
    );

    // 5. Overdue sweep and reports
    println!("5. Sweeping overdue invoices:");
    let report = workspace.invoices().mark_overdue().await?;
    println!(
        "   ✓ {} newly overdue, {} overdue in total",
        report.newly_overdue, report.total_overdue
    );

    let summary = workspace.invoices().financial_summary().await?;
    println!(
        "   Revenue {} | pending {} | partial {} | overdue {}\n",
        round_for_display(summary.total_revenue),
        round_for_display(summary.pending_amount),
        round_for_display(summary.partial_amount),
        round_for_display(summary.overdue_amount)
    );

    workspace.backend().log_stats().await;
    println!("=== Done ===\n");
    Ok(())
}
