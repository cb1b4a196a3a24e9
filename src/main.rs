mod app;
mod appsettings;
mod background;
mod ui;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use app::AppContext;
use appsettings::AppSettings;
use background::BackgroundWorkReceiver;
use freezap_scheduler::{
    DeferredScheduleRegistrar,
    simulated::{SimulatedAlarmService, SimulatedDevice, SimulatedJobService, SimulatedSystemServices},
};
use freezap_worker::{LongAction, MainThread, SharedWorkUnit};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    runtime, task,
};
use ui::{Action, ConsoleFeedback, MainScreen, UiFeedback};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let settings = AppSettings::load()?;
    log::info!("Starting freezap [settings = {settings:?}]");

    let main_thread = MainThread::spawn()?;
    let app = build_app(&main_thread, settings);
    let feedback: Arc<dyn UiFeedback> = Arc::new(ConsoleFeedback::new());

    print_menu();
    let mut screen = create_screen(&app, &feedback).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => continue,
            "quit" | "exit" => break,
            "help" => print_menu(),
            "recreate" => {
                destroy_screen(&app, screen).await?;
                screen = create_screen(&app, &feedback).await?;
                log::info!("Screen recreated");
            }
            input => match input.parse::<Action>() {
                Ok(action) => {
                    let screen = Arc::clone(&screen);
                    app.main.post(move || screen.on_action(action))?;
                }
                Err(error) => println!("{error}"),
            },
        }
    }

    destroy_screen(&app, screen).await?;
    task::spawn_blocking(move || main_thread.shutdown()).await?;
    log::info!("Bye");

    Ok(())
}

fn build_app(main_thread: &MainThread, settings: AppSettings) -> Arc<AppContext> {
    let runtime = runtime::Handle::current();
    let work: SharedWorkUnit = Arc::new(LongAction::new(settings.work_duration()));

    let device = Arc::new(SimulatedDevice::new(
        settings.device.charging,
        settings.device.network,
    ));
    let services = SimulatedSystemServices::new()
        .with_alarm_service(Arc::new(SimulatedAlarmService::new(runtime.clone())))
        .with_job_service(Arc::new(SimulatedJobService::new(runtime.clone(), device)));
    let receiver = Arc::new(BackgroundWorkReceiver::new(Arc::clone(&work)));
    let registrar = DeferredScheduleRegistrar::new(Arc::new(services), receiver.clone(), receiver);

    AppContext::new(runtime, main_thread.handle(), work, registrar, settings)
}

async fn create_screen(
    app: &Arc<AppContext>,
    feedback: &Arc<dyn UiFeedback>,
) -> anyhow::Result<Arc<MainScreen>> {
    let app_clone = Arc::clone(app);
    let feedback = Arc::clone(feedback);
    let screen = app
        .main
        .run(move || {
            let screen = MainScreen::new(app_clone, feedback);
            screen.on_create().map(|_| screen)
        })
        .await??;

    Ok(screen)
}

async fn destroy_screen(app: &Arc<AppContext>, screen: Arc<MainScreen>) -> anyhow::Result<()> {
    app.main.run(move || screen.on_destroy()).await?;
    Ok(())
}

fn print_menu() {
    println!("Type an action tag and press enter:");
    for action in Action::ALL {
        println!("  {:>3}  {}", action.tag(), action.label());
    }
    println!("  recreate  destroy and recreate the screen");
    println!("  quit      exit");
}
