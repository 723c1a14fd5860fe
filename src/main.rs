use anyhow::Result;
use ipdash_core::Language;
use ipdash_dashboard::{ClockProvider, ClockRequest, Dashboard, LocalClock, QueryState};
use ipdash_weather::CHART_HOURS;

/// Usage: `ipdash [TARGET] [LANG]`
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    ipdash_core::init()?;

    // Create and initialize application
    let mut app = ipdash_core::App::new()?;
    app.initialize()?;

    let mut args = std::env::args().skip(1);
    let target = args.next().unwrap_or_default();
    let language = args.next().map(|raw| raw.parse::<Language>()).transpose()?;

    let dashboard = Dashboard::from_config(app.config())?;
    tracing::info!("ipdash started");

    if let Some(language) = language {
        dashboard.change_language(language).await;
    }

    let state = if target.trim().is_empty() {
        dashboard.start().await
    } else {
        dashboard.search(&target).await
    };

    print_state(&state);

    // Graceful shutdown
    app.shutdown()?;

    Ok(())
}

fn print_state(state: &QueryState) {
    if let Some(error) = &state.error {
        println!("Error: {}", error);
        return;
    }
    let Some(location) = &state.location else {
        println!("No data");
        return;
    };

    println!("{}", location);
    println!("Source:   {}", location.source);

    if let Some(request) = ClockRequest::for_location(location, state.language) {
        match LocalClock.display(&request) {
            Some(clock) => println!("Local:    {} {}", clock.time, clock.date),
            None => println!("Local:    unavailable"),
        }
    }

    match (&state.weather, &state.weather_error) {
        (Some(weather), _) => {
            let condition = weather.condition();
            println!(
                "\nWeather: {:.1}°C, {} ({}), wind {:.1} km/h",
                weather.current_weather.temperature,
                condition.description(),
                if weather.is_day() { "day" } else { "night" },
                weather.current_weather.windspeed,
            );
            if let Some(humidity) = weather.current_humidity() {
                println!("  Humidity:  {:.0}%", humidity);
            }
            for point in weather.chart_points(CHART_HOURS) {
                println!("  {:>5}  {:.1}°C", point.label, point.temperature);
            }
        }
        (None, Some(error)) => println!("\nWeather: {}", error),
        (None, None) => {}
    }
}
