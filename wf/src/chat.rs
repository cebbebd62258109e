//! Interactive planning chat
//!
//! A rustyline REPL over the engine. The terminal layer only renders
//! `UiEvent`s; all dialog state lives in the engine's session.

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::config::Config;
use crate::engine::{Engine, UiEvent};
use crate::itinerary::Itinerary;

/// Run the interactive chat
///
/// This is the main entry point for `wf chat`.
pub async fn run_interactive(config: &Config) -> Result<()> {
    // Validate API key early
    if std::env::var(&config.llm.api_key_env).is_err() {
        return Err(eyre::eyre!(
            "Model API key not found. Set the {} environment variable.",
            config.llm.api_key_env
        ));
    }

    let mut engine = Engine::from_config(config)?;
    let conversation = engine.open_conversation();

    print_welcome();

    let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

    loop {
        let readline = rl.readline(&format!("{} ", ">".bright_green()));

        match readline {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(input);

                if let Some(rest) = input.strip_prefix('/') {
                    let (cmd, arg) = match rest.split_once(' ') {
                        Some((cmd, arg)) => (cmd, arg.trim()),
                        None => (rest, ""),
                    };
                    match cmd {
                        "help" | "h" => print_help(),
                        "quit" | "q" | "exit" => break,
                        // Broad rework of the whole plan, not a minimal patch
                        "redo" => {
                            let event = engine.rebuild_plan(conversation, arg).await;
                            render_event(&event);
                        }
                        other => {
                            println!("Unknown command: /{}. Type {} for help.", other, "/help".yellow());
                        }
                    }
                } else {
                    let event = engine.submit_user_text(conversation, input).await;
                    render_event(&event);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(err) => {
                return Err(eyre::eyre!("Readline error: {}", err));
            }
        }
    }

    engine.close_conversation(conversation);
    println!("Safe travels!");
    Ok(())
}

fn print_welcome() {
    println!();
    println!("{}", "Wayfinder".bright_cyan().bold());
    println!("Tell me where you'd like to go, or describe the kind of trip you're after.");
    println!(
        "Try {} or {}. Type {} for help, {} to quit.",
        "\"surprise me\"".italic(),
        "\"a relaxed week somewhere warm\"".italic(),
        "/help".yellow(),
        "/quit".yellow()
    );
    println!();
}

fn print_help() {
    println!("Commands:");
    println!("  {}          Show this help", "/help".yellow());
    println!("  {}          Quit", "/quit".yellow());
    println!("  {}  Rework the whole plan from a broad request", "/redo <text>".yellow());
    println!();
    println!("Anything else is part of the conversation. Once a plan exists,");
    println!("plain messages become edit requests against it.");
}

/// Render one engine event to the terminal
pub fn render_event(event: &UiEvent) {
    match event {
        UiEvent::AskQuestion { text, suggestions } => {
            println!("{}", text.bright_white());
            if !suggestions.is_empty() {
                println!("  {}", format!("e.g. {}", suggestions.join(" · ")).dimmed());
            }
        }
        UiEvent::ShowItinerary { plan_id, itinerary } => {
            render_itinerary(itinerary);
            println!("{}", format!("Saved as {}", plan_id).dimmed());
        }
        UiEvent::ShowError { message } => {
            println!("{}", message.red());
        }
    }
}

/// Render a full itinerary to the terminal
pub fn render_itinerary(itinerary: &Itinerary) {
    println!();
    println!("{}", itinerary.destination.bright_cyan().bold());
    if !itinerary.description.is_empty() {
        println!("{}", itinerary.description);
    }
    println!(
        "{} · {} traveler(s) · {} · {}",
        itinerary.duration,
        itinerary.travelers,
        itinerary.budget,
        itinerary.total_cost
    );
    println!();

    for day in &itinerary.daily_plan {
        println!("{} {}", format!("Day {}:", day.day).yellow().bold(), day.title);
        if !day.description.is_empty() {
            println!("  {}", day.description.dimmed());
        }
        for (slot, (activity, detail)) in ["Morning", "Afternoon", "Evening"]
            .iter()
            .zip(day.activities.iter().zip(day.activities_description.iter()))
        {
            println!("  {} {}", format!("{}:", slot).green(), activity);
            if !detail.is_empty() {
                println!("    {}", detail.dimmed());
            }
        }
        let meals = [
            ("Breakfast", &day.meals.breakfast),
            ("Lunch", &day.meals.lunch),
            ("Dinner", &day.meals.dinner),
        ];
        for (label, meal) in meals {
            if let Some(meal) = meal {
                println!("  {} {}", format!("{}:", label).blue(), meal);
            }
        }
        for tip in &day.travel_tips {
            println!("  {} {}", "Tip:".magenta(), tip);
        }
        println!();
    }
}
