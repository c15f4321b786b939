//! fittrack - Workout tracker with rule-based training plan generation

use anyhow::{Context, Result, bail};
use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};

use fittrack::db::{Database, NewWorkoutLog, PlanDetail, WorkoutLogPatch};
use fittrack::exercises::{Difficulty, NewExercise};
use fittrack::planner::{ExercisePreferences, ExperienceLevel, FitnessGoal, GeneratedPlan, PlanRequest, generate_plan};
use fittrack::stats::Stats;
use fittrack::tui::App;

#[derive(Parser)]
#[command(name = "fittrack")]
#[command(author, version, about = "Workout tracker with generated training plans")]
struct Cli {
    /// SQLite database path
    #[arg(long, global = true, env = "FITTRACK_DB", default_value = "fittrack.db")]
    db: String,

    /// Id of the user to act as
    #[arg(long, global = true, env = "FITTRACK_USER", default_value_t = 1)]
    user: i64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the plan viewer
    Tui,

    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommand,
    },

    /// Manage the exercise catalog
    Exercises {
        #[command(subcommand)]
        action: ExerciseCommand,
    },

    /// Generate a training plan for the current user
    Generate {
        /// Training days per week (1-7)
        #[arg(short, long)]
        days: u32,

        /// Equipment to avoid (repeatable)
        #[arg(long = "exclude-equipment")]
        exclude_equipment: Vec<String>,

        /// Exercise names to avoid (repeatable)
        #[arg(long = "exclude-exercise")]
        exclude_exercise: Vec<String>,

        /// Plan name
        #[arg(long)]
        name: Option<String>,

        /// Plan description
        #[arg(long)]
        description: Option<String>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage stored plans
    Plans {
        #[command(subcommand)]
        action: PlanCommand,
    },

    /// Log a workout against a plan exercise
    Log {
        /// Plan exercise id (see `plans show`)
        plan_exercise_id: i64,

        /// Number of sets
        #[arg(short, long)]
        sets: i32,

        /// Number of reps per set
        #[arg(short, long)]
        reps: i32,

        /// Weight used
        #[arg(short, long)]
        weight: Option<f64>,

        /// Duration in minutes
        #[arg(long)]
        duration: Option<f64>,

        /// Optional notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List workout history
    History {
        /// Number of records to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Edit or delete logged workouts
    Logs {
        #[command(subcommand)]
        action: LogCommand,
    },

    /// Track body weight
    Weight {
        #[command(subcommand)]
        action: WeightCommand,
    },

    /// Show workout statistics
    Stats {
        /// First day of the window (default: 30 days ago)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day of the window (default: today)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum UserCommand {
    /// Register a user
    Create { username: String, email: String },

    /// Set experience level and fitness goal
    Profile {
        /// beginner, intermediate or advanced
        #[arg(long)]
        level: String,

        /// strength, hypertrophy, endurance or general
        #[arg(long)]
        goal: String,
    },

    /// Show the current user
    Show,
}

#[derive(Subcommand)]
enum ExerciseCommand {
    /// Insert the built-in catalog into an empty database
    Seed,

    /// List the catalog
    List,

    /// Add an exercise
    Add {
        name: String,

        #[arg(long, default_value = "Strength")]
        category: String,

        /// Primary muscle (e.g. "Chest", "Legs")
        #[arg(long)]
        primary: String,

        #[arg(long)]
        secondary: Option<String>,

        /// Beginner, Intermediate or Advanced
        #[arg(long, default_value = "Beginner")]
        difficulty: String,

        #[arg(long)]
        equipment: Option<String>,

        #[arg(long)]
        sets: Option<u32>,

        #[arg(long)]
        reps: Option<u32>,

        /// Base duration for timed exercises (e.g. "30 min")
        #[arg(long)]
        duration: Option<String>,
    },
}

#[derive(Subcommand)]
enum PlanCommand {
    /// List the user's plans
    List,

    /// Show a plan with its days and exercises
    Show { id: i64 },

    /// Make a plan the active one
    Activate { id: i64 },

    /// Delete a plan
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum LogCommand {
    /// Change fields of a logged workout (see `history`)
    Edit {
        id: i64,

        #[arg(short, long)]
        sets: Option<i32>,

        #[arg(short, long)]
        reps: Option<i32>,

        #[arg(short, long)]
        weight: Option<f64>,

        /// Duration in minutes
        #[arg(long)]
        duration: Option<f64>,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Delete a logged workout
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum WeightCommand {
    /// Record body weight in kg
    Log {
        kg: f64,

        /// Day of the measurement (default: now)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Daily average weight
    History {
        /// First day (default: 30 days ago)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day (default: today)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_profile(level: &str, goal: &str) -> Result<(ExperienceLevel, FitnessGoal)> {
    let Some(level) = ExperienceLevel::parse(level) else {
        bail!("unknown level {level:?}, expected beginner, intermediate or advanced");
    };
    let Some(goal) = FitnessGoal::parse(goal) else {
        bail!("unknown goal {goal:?}, expected strength, hypertrophy, endurance or general");
    };
    Ok((level, goal))
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let db = Database::open(&cli.db)?;
    let user_id = cli.user;

    match cli.command {
        Some(Commands::Tui) | None => {
            let mut app = App::new(db, user_id)?;
            app.run()?;
        }

        Some(Commands::User { action }) => match action {
            UserCommand::Create { username, email } => {
                let id = db.create_user(&username, &email)?;
                println!("Created user {} (id: {})", username, id);
            }
            UserCommand::Profile { level, goal } => {
                let (level, goal) = parse_profile(&level, &goal)?;
                db.update_profile(user_id, level, goal)?;
                println!("Profile updated: {} / {}", level.as_str(), goal.as_str());
            }
            UserCommand::Show => {
                let user = db
                    .get_user(user_id)?
                    .with_context(|| format!("user {user_id} not found"))?;
                println!("{} <{}> (id: {})", user.username, user.email, user.id);
                println!(
                    "Level: {} | Goal: {}",
                    user.experience_level.map_or("-", |l| l.as_str()),
                    user.fitness_goal.map_or("-", |g| g.as_str())
                );
                if let Some(weight) = user.weight_kg {
                    println!("Weight: {weight} kg");
                }
            }
        },

        Some(Commands::Exercises { action }) => match action {
            ExerciseCommand::Seed => {
                let added = db.seed_default_catalog()?;
                println!("Added {} exercises", added);
            }
            ExerciseCommand::List => {
                println!("{:>4} | {:28} | {:12} | {:12} | {:12} | {}", "id", "name", "primary", "secondary", "difficulty", "equipment");
                println!("{:-<100}", "");
                for e in db.list_exercises()? {
                    println!(
                        "{:>4} | {:28} | {:12} | {:12} | {:12} | {}",
                        e.id,
                        e.name,
                        e.primary_muscle,
                        e.secondary().unwrap_or("-"),
                        e.difficulty,
                        e.equipment.as_deref().unwrap_or("-")
                    );
                }
            }
            ExerciseCommand::Add {
                name,
                category,
                primary,
                secondary,
                difficulty,
                equipment,
                sets,
                reps,
                duration,
            } => {
                let Some(difficulty) = Difficulty::parse(&difficulty) else {
                    bail!("unknown difficulty {difficulty:?}, expected Beginner, Intermediate or Advanced");
                };
                let id = db.add_exercise(&NewExercise {
                    name: name.clone(),
                    category,
                    primary_muscle: primary,
                    secondary_muscle: secondary,
                    difficulty,
                    equipment,
                    base_sets: sets,
                    base_reps: reps,
                    base_duration: duration,
                })?;
                println!("Added: {} (id: {})", name, id);
            }
        },

        Some(Commands::Generate {
            days,
            exclude_equipment,
            exclude_exercise,
            name,
            description,
            json,
        }) => {
            let request = PlanRequest {
                user_id,
                days_per_week: days,
                preferences: Some(ExercisePreferences {
                    excluded_equipment: exclude_equipment.into_iter().collect(),
                    excluded_exercise_names: exclude_exercise.into_iter().collect(),
                }),
                plan_name: name,
                description,
            };
            let plan = generate_plan(&db, &request)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print_generated(&plan);
            }
        }

        Some(Commands::Plans { action }) => match action {
            PlanCommand::List => {
                for p in db.list_plans(user_id)? {
                    let marker = if p.is_active { "*" } else { " " };
                    println!("{} {:>4} | {:32} | {} days/week", marker, p.id, p.name, p.days_per_week);
                }
            }
            PlanCommand::Show { id } => print_detail(&db.plan_detail(user_id, id)?),
            PlanCommand::Activate { id } => {
                let plan = db.set_active_plan(user_id, id)?;
                println!("Active plan: {} (id: {})", plan.name, plan.id);
            }
            PlanCommand::Delete { id } => {
                db.delete_plan(user_id, id)?;
                println!("Deleted plan {}", id);
            }
        },

        Some(Commands::Log {
            plan_exercise_id,
            sets,
            reps,
            weight,
            duration,
            notes,
        }) => {
            let scheduled = db
                .get_plan_exercise(plan_exercise_id)?
                .with_context(|| format!("plan exercise {plan_exercise_id} not found"))?;
            let log = db.log_workout(
                user_id,
                &NewWorkoutLog {
                    exercise_id: scheduled.exercise_id,
                    plan_exercise_id: Some(plan_exercise_id),
                    date: Utc::now(),
                    sets,
                    reps,
                    duration_minutes: duration,
                    weight,
                    notes,
                },
            )?;
            println!(
                "Logged: {} - {}x{} (id: {})",
                scheduled.name,
                sets,
                reps,
                log.id.unwrap_or_default()
            );
        }

        Some(Commands::History { limit }) => {
            println!("Recent workouts:");
            println!("{:-<60}", "");
            for log in db.list_logs(user_id)?.iter().take(limit) {
                let name = db
                    .get_exercise(log.exercise_id)?
                    .map(|e| e.name)
                    .unwrap_or_else(|| log.exercise_id.to_string());
                println!(
                    "{} | {:24} | {}x{} | {} | {}",
                    log.date.format("%Y-%m-%d %H:%M"),
                    name,
                    log.sets,
                    log.reps,
                    log.weight.map_or("-".to_string(), |w| format!("{w}")),
                    log.notes.as_deref().unwrap_or("-")
                );
            }
        }

        Some(Commands::Logs { action }) => match action {
            LogCommand::Edit {
                id,
                sets,
                reps,
                weight,
                duration,
                notes,
            } => {
                let patch = WorkoutLogPatch {
                    sets,
                    reps,
                    duration_minutes: duration,
                    weight,
                    notes,
                };
                let log = db.update_log(user_id, id, &patch)?;
                println!("Updated log {}: {}x{}", id, log.sets, log.reps);
            }
            LogCommand::Delete { id } => {
                db.delete_log(user_id, id)?;
                println!("Deleted log {}", id);
            }
        },

        Some(Commands::Weight { action }) => match action {
            WeightCommand::Log { kg, date } => {
                let date = date.and_then(|d| d.and_hms_opt(12, 0, 0)).map(|d| d.and_utc());
                let entry = db.log_weight(user_id, kg, date)?;
                println!("Logged {} kg on {}", entry.weight, entry.date);
            }
            WeightCommand::History { from, to, json } => {
                let end = to.unwrap_or_else(|| Utc::now().date_naive());
                let start = from.unwrap_or(end - Duration::days(29));
                let history = db.weight_history(user_id, start, end)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&history)?);
                } else {
                    for entry in &history {
                        println!("{} | {:.1} kg", entry.date, entry.weight);
                    }
                }
            }
        },

        Some(Commands::Stats { from, to, json }) => {
            let today = Utc::now().date_naive();
            let end = to.unwrap_or(today);
            let start = from.unwrap_or(end - Duration::days(29));
            let summary = Stats::load(&db, user_id, start, end)?.summary(today);

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Workout Statistics {} .. {}", summary.start, summary.end);
                println!("{:-<40}", "");
                println!("Total workouts: {}", summary.total_workouts);
                println!("Current streak: {} days", summary.current_streak);
                println!("By type:");
                for (category, count) in &summary.by_type {
                    println!("  {:20} {}", category, count);
                }
                println!("By muscle group:");
                for (muscle, count) in &summary.by_muscle_group {
                    println!("  {:20} {}", muscle, count);
                }
                println!("Per week:");
                for week in &summary.weekly {
                    println!("  {}-W{:02}            {}", week.year, week.week, week.count);
                }
            }
        }
    }

    Ok(())
}

fn print_generated(plan: &GeneratedPlan) {
    println!("{} (id: {})", plan.name, plan.id);
    println!("{}", plan.description);
    println!("{:-<60}", "");
    for day in &plan.days {
        println!("Day {}: {}", day.day_number, day.description);
        if day.exercises.is_empty() {
            println!("  (no matching exercises in catalog)");
        }
        for e in &day.exercises {
            let prescription = match &e.recommended_duration {
                Some(duration) => duration.clone(),
                None => format!("{}x{}", e.recommended_sets, e.recommended_reps),
            };
            println!("  {:28} {:12} {}", e.name, e.primary_muscle, prescription);
        }
    }
}

fn print_detail(detail: &PlanDetail) {
    let plan = &detail.plan;
    let active = if plan.is_active { " [active]" } else { "" };
    println!("{} (id: {}){}", plan.name, plan.id, active);
    if let Some(description) = &plan.description {
        println!("{}", description);
    }
    println!("{:-<60}", "");
    for day in &detail.days {
        println!(
            "Day {}: {}",
            day.day.day_number,
            day.day.description.as_deref().unwrap_or("-")
        );
        for e in &day.exercises {
            println!("  {:>4} | {:28} | {}", e.id, e.name, e.primary_muscle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_rejects_unknown_values() {
        let (level, goal) = parse_profile("Beginner", "strength").unwrap();
        assert_eq!(level, ExperienceLevel::Beginner);
        assert_eq!(goal, FitnessGoal::Strength);
        assert!(parse_profile("pro", "strength").is_err());
        assert!(parse_profile("advanced", "weight loss").is_err());
    }

    #[test]
    fn test_cli_parses_log_and_weight_commands() {
        let cli = Cli::try_parse_from(["fittrack", "logs", "edit", "7", "--sets", "4"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Logs { action: LogCommand::Edit { id: 7, sets: Some(4), reps: None, .. } })
        ));

        let cli = Cli::try_parse_from(["fittrack", "weight", "log", "71.5", "--date", "2026-10-01"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Weight { action: WeightCommand::Log { date: Some(_), .. } })
        ));
    }
}
