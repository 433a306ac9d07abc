//! Headless command-line driver for the tracker.
//!
//! Plays the external-collaborator role: every subcommand goes through the
//! record-access layer, and reminder mutations are followed by the matching
//! scheduler command. `run` performs the boot reconciliation pass and keeps
//! the armed timers alive until interrupted.

use std::sync::Arc;

use ladder::{
    AlarmScheduler, ChangeHub, LadderConfig, LadderError, LogNotifier, ReminderValues, Target,
    TaskStatus, TaskValues, TokioTimers, WorkProvider, WorkStore,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LADDER_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("ladder failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> ladder::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    let (provider, scheduler) = open()?;

    match args[1].as_str() {
        "add-reminder" => {
            let [name, time] = require_args(&args, "add-reminder <name> <HH:MM> [details]")?;
            let (hour, minute) = parse_time(time)?;
            let details = args.get(4).cloned();

            let mut values = ReminderValues::new().with_name(name).with_time(hour, minute);
            if details.is_some() {
                values = values.with_details(details);
            }
            let id = provider.insert(&Target::Reminders, values.into())?;
            scheduler.schedule(id)?;
            println!("added reminder {id}, daily at {hour:02}:{minute:02}");
        }
        "retime-reminder" => {
            let [id, time] = require_args(&args, "retime-reminder <id> <HH:MM>")?;
            let id = parse_id(id)?;
            let (hour, minute) = parse_time(time)?;

            let changed = provider.update(
                &Target::Reminder(id),
                ReminderValues::new().with_time(hour, minute).into(),
                None,
            )?;
            if changed == 0 {
                println!("no reminder {id}");
                return Ok(());
            }
            scheduler.schedule(id)?;
            println!("reminder {id} moved to {hour:02}:{minute:02}");
        }
        "delete-reminder" => {
            let [id] = require_args(&args, "delete-reminder <id>")?;
            let id = parse_id(id)?;
            let deleted = provider.delete(&Target::Reminder(id), None)?;
            scheduler.cancel(id);
            println!("deleted {deleted} reminder(s)");
        }
        "list-reminders" => {
            let reminders = provider.reminders()?;
            if reminders.is_empty() {
                println!("no reminders");
            }
            for r in reminders {
                println!(
                    "{}\t{:02}:{:02}\t{}\t{}",
                    r.id,
                    r.hour,
                    r.minute,
                    r.name,
                    r.details.as_deref().unwrap_or("-")
                );
            }
        }
        "add-task" => {
            let [title] = require_args(&args, "add-task <title> [details]")?;
            let details = args.get(3).cloned();

            let mut values = TaskValues::new().with_title(title);
            if details.is_some() {
                values = values.with_details(details);
            }
            let id = provider.insert(&Target::Tasks, values.into())?;
            println!("added task {id}");
        }
        "start-task" => set_status(&provider, &args, TaskStatus::InProgress)?,
        "finish-task" => set_status(&provider, &args, TaskStatus::Completed)?,
        "list-tasks" => {
            let filter = match args.get(2) {
                Some(raw) => {
                    let status = TaskStatus::from_i64(parse_id(raw)?).ok_or_else(|| {
                        LadderError::Config(format!("unknown status `{raw}` (use 0|1|2)"))
                    })?;
                    Some(ladder::Filter::Status(status))
                }
                None => None,
            };
            let rows = provider
                .query(&Target::Tasks, filter.as_ref(), Some(ladder::Sort::ById))?
                .into_tasks()
                .unwrap_or_default();
            if rows.is_empty() {
                println!("no tasks");
            }
            for t in rows {
                println!(
                    "{}\t{}\t{}\t{}",
                    t.id,
                    t.status,
                    t.title,
                    t.details.as_deref().unwrap_or("-")
                );
            }
        }
        "delete-task" => {
            let [id] = require_args(&args, "delete-task <id>")?;
            let deleted = provider.delete(&Target::Task(parse_id(id)?), None)?;
            println!("deleted {deleted} task(s)");
        }
        "type" => {
            let [raw] = require_args(&args, "type <target>")?;
            let target = Target::parse(raw)?;
            println!("{}", provider.resolve_type(&target));
        }
        "run" => {
            let armed = scheduler.reschedule_all()?;
            println!("armed {armed} trigger(s); watching (ctrl-c to exit)");
            std::future::pending::<()>().await;
        }
        "help" | "--help" | "-h" => print_usage(),
        other => {
            return Err(LadderError::Config(format!(
                "unknown subcommand `{other}` (try `ladder help`)"
            )))
        }
    }

    Ok(())
}

fn open() -> ladder::Result<(Arc<WorkProvider>, AlarmScheduler)> {
    let config = LadderConfig::load_default()?;
    let store = WorkStore::open(&config.db_path())?;
    let provider = Arc::new(WorkProvider::new(store, Arc::new(ChangeHub::new())));
    let scheduler = AlarmScheduler::new(
        Arc::clone(&provider),
        Arc::new(TokioTimers::new()),
        Arc::new(LogNotifier),
    );
    Ok((provider, scheduler))
}

fn set_status(
    provider: &WorkProvider,
    args: &[String],
    status: TaskStatus,
) -> ladder::Result<()> {
    let [id] = require_args(args, "<start|finish>-task <id>")?;
    let id = parse_id(id)?;
    let changed = provider.update(
        &Target::Task(id),
        TaskValues::new().with_status(status).into(),
        None,
    )?;
    if changed == 0 {
        println!("no task {id}");
    } else {
        println!("task {id} is now {status}");
    }
    Ok(())
}

fn require_args<'a, const N: usize>(
    args: &'a [String],
    usage: &str,
) -> ladder::Result<[&'a str; N]> {
    if args.len() < 2 + N {
        return Err(LadderError::Config(format!("usage: ladder {usage}")));
    }
    let mut out = [""; N];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = &args[2 + i];
    }
    Ok(out)
}

fn parse_id(raw: &str) -> ladder::Result<i64> {
    raw.parse::<i64>()
        .map_err(|_| LadderError::Config(format!("`{raw}` is not a numeric id")))
}

fn parse_time(raw: &str) -> ladder::Result<(u32, u32)> {
    let invalid = || LadderError::Config(format!("`{raw}` is not a HH:MM time"));
    let (hour, minute) = raw.split_once(':').ok_or_else(invalid)?;
    Ok((
        hour.parse().map_err(|_| invalid())?,
        minute.parse().map_err(|_| invalid())?,
    ))
}

fn print_usage() {
    println!(
        "usage: ladder <command>\n\n\
         reminders:\n\
         \x20 add-reminder <name> <HH:MM> [details]   insert and arm a daily trigger\n\
         \x20 retime-reminder <id> <HH:MM>            move and re-arm a reminder\n\
         \x20 delete-reminder <id>                    delete and cancel its trigger\n\
         \x20 list-reminders\n\n\
         tasks:\n\
         \x20 add-task <title> [details]\n\
         \x20 start-task <id>                         mark in progress\n\
         \x20 finish-task <id>                        mark completed\n\
         \x20 list-tasks [status]                     optionally filter by 0|1|2\n\
         \x20 delete-task <id>\n\n\
         other:\n\
         \x20 type <target>                           print the type tag for an address\n\
         \x20 run                                     arm all triggers and keep watching"
    );
}
