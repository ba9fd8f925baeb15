use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use tracing::info;

use bazi::cli::{BirthArgs, Cli, Command, HistoryCommand, OutputFormat};
use bazi::config::Config;
use bazi::{
    Almanac, BirthData, CalendarSystem, Chart, ChartDeriver, CivilDate, Gender, HistoryRecord, HistoryStore, ZiHourRule,
};
use lunarcal::{LunarCalendar, LunarDate};

fn setup_logging(verbose: bool) -> Result<()> {
    // Logs go to stderr so stdout stays clean for chart output
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre!("{}", e))?;

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let history_path = cli.history.clone().unwrap_or_else(|| config.history.expanded_path());
    let store = HistoryStore::new(&history_path, config.history.limit);

    match cli.command {
        Command::Chart {
            birth,
            format,
            save,
            name,
        } => cmd_chart(&config, &store, birth, format, save, name),
        Command::Match {
            date_a,
            time_a,
            date_b,
            time_b,
            calendar,
            format,
        } => {
            let calendar = calendar.unwrap_or(config.default_calendar);
            let a = BirthData::parse(date_a.as_deref(), time_a.as_deref(), Gender::Male, calendar)
                .context("Invalid birth data for person A")?;
            let b = BirthData::parse(date_b.as_deref(), time_b.as_deref(), Gender::Female, calendar)
                .context("Invalid birth data for person B")?;
            cmd_match(&config, &a, &b, format)
        }
        Command::Almanac { date, format } => cmd_almanac(date.as_deref(), format),
        Command::Convert { date, calendar, leap } => cmd_convert(&date, calendar, leap),
        Command::Terms { year, format } => cmd_terms(year, format),
        Command::History { command } => cmd_history(&store, command),
    }
}

fn cmd_chart(
    config: &Config,
    store: &HistoryStore,
    args: BirthArgs,
    format: OutputFormat,
    save: bool,
    name: Option<String>,
) -> Result<()> {
    let rule = args.zi_hour.unwrap_or(config.zi_hour);
    let calendar = args.calendar.unwrap_or(config.default_calendar);
    let birth = BirthData::parse(args.date.as_deref(), args.time.as_deref(), args.gender, calendar)?;

    let deriver = ChartDeriver::lunisolar(rule);
    let chart = deriver.derive_birth(&birth)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&chart)?),
        OutputFormat::Text => print_chart(&birth, &chart, rule),
    }

    if save {
        let label = name.unwrap_or_else(|| format!("{} {}", birth.birth_date, birth.birth_time));
        let record = HistoryRecord::new(label, birth, chart);
        let id = record.id.clone();
        store.save(record).context("Failed to save chart")?;
        // Keep stdout parseable in JSON mode
        match format {
            OutputFormat::Json => eprintln!("Saved to history: {}", id),
            OutputFormat::Text => println!("{} Saved to history: {}", "✓".green(), id.cyan()),
        }
    }

    Ok(())
}

fn cmd_match(config: &Config, a: &BirthData, b: &BirthData, format: OutputFormat) -> Result<()> {
    let deriver = ChartDeriver::lunisolar(config.zi_hour);
    let (chart_a, chart_b) = deriver.derive_pair(a, b)?;
    info!(a = %chart_a, b = %chart_b, "Derived chart pair");

    match format {
        OutputFormat::Json => {
            let pair = serde_json::json!({ "a": chart_a, "b": chart_b });
            println!("{}", serde_json::to_string_pretty(&pair)?);
        }
        OutputFormat::Text => {
            println!("{}", "Person A".bold());
            print_chart(a, &chart_a, config.zi_hour);
            println!();
            println!("{}", "Person B".bold());
            print_chart(b, &chart_b, config.zi_hour);
            println!();
            let relation = if chart_a.day_master_element == chart_b.day_master_element {
                "same element".to_string()
            } else {
                format!("{} / {}", chart_a.day_master_element, chart_b.day_master_element)
            };
            println!("Day masters: {} {} ({})", chart_a.day_master, chart_b.day_master, relation);
        }
    }
    Ok(())
}

fn cmd_almanac(date: Option<&str>, format: OutputFormat) -> Result<()> {
    let date = match date {
        Some(value) => solar_date(&CivilDate::parse(value)?)?,
        None => chrono::Local::now().date_naive(),
    };
    let almanac = Almanac::for_date(&LunarCalendar::new(), date)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&almanac)?),
        OutputFormat::Text => {
            println!("{} {}", almanac.date.to_string().bold(), almanac.lunar_label.yellow());
            println!("  Day:        {}", almanac.day_ganzhi.to_string().cyan());
            println!(
                "  Year:       {} ({} {})",
                almanac.year_ganzhi,
                almanac.zodiac,
                almanac.zodiac.chinese()
            );
            println!(
                "  Solar term: {} {}",
                almanac.solar_term.chinese(),
                almanac.solar_term.pinyin()
            );
            if let Some(term) = almanac.term_today {
                println!(
                    "  {} {} begins at {}",
                    term.term.chinese().green(),
                    term.term.pinyin(),
                    term.moment.format("%H:%M")
                );
            }
        }
    }
    Ok(())
}

fn cmd_convert(value: &str, calendar: CalendarSystem, leap: bool) -> Result<()> {
    let date = CivilDate::parse(value)?;
    let lunar_calendar = LunarCalendar::new();

    match calendar {
        CalendarSystem::Solar => {
            let lunar = lunar_calendar.from_solar(solar_date(&date)?)?;
            println!("{} → {} ({})", date, lunar, lunar.chinese().yellow());
        }
        CalendarSystem::Lunar => {
            let lunar = if leap {
                LunarDate::in_leap_month(date.year, date.month, date.day)
            } else {
                LunarDate::new(date.year, date.month, date.day)
            };
            let solar = lunar_calendar.to_solar(lunar)?;
            println!("{} ({}) → {}", lunar, lunar.chinese().yellow(), solar);
        }
    }
    Ok(())
}

fn cmd_terms(year: i32, format: OutputFormat) -> Result<()> {
    let terms = lunarcal::terms_of_year(year)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&terms)?),
        OutputFormat::Text => {
            for t in terms {
                let name = if t.term.is_sectional() {
                    t.term.chinese().green()
                } else {
                    t.term.chinese().normal()
                };
                println!(
                    "{} {:<12} {}",
                    name,
                    t.term.pinyin(),
                    t.moment.format("%Y-%m-%d %H:%M")
                );
            }
        }
    }
    Ok(())
}

fn cmd_history(store: &HistoryStore, command: HistoryCommand) -> Result<()> {
    match command {
        HistoryCommand::List { format } => {
            let records = store.list()?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
                OutputFormat::Text => {
                    if records.is_empty() {
                        println!("No saved charts");
                    }
                    for r in records {
                        println!("{} {} {}", r.id.yellow(), r.chart, r.label.dimmed());
                    }
                }
            }
        }
        HistoryCommand::Show { id } => {
            let record = store.get(&id)?;
            println!("{} {}", record.label.bold(), record.id.dimmed());
            print_chart(&record.birth, &record.chart, ZiHourRule::default());
            if let Some(analysis) = &record.analysis {
                println!("Analysis: {}", serde_json::to_string_pretty(analysis)?);
            }
        }
        HistoryCommand::Delete { id } => {
            let remaining = store.delete(&id)?;
            println!("{} Deleted {} ({} remaining)", "✓".green(), id, remaining.len());
        }
        HistoryCommand::Clear => {
            store.clear()?;
            println!("{} History cleared", "✓".green());
        }
    }
    Ok(())
}

fn print_chart(birth: &BirthData, chart: &Chart, rule: ZiHourRule) {
    println!(
        "Born {} {} ({}, {})",
        birth.birth_date, birth.birth_time, birth.calendar_type, birth.gender
    );
    if birth.birth_time.hour == 23 {
        println!("  {}", format!("late Zi hour, rule: {}", rule).dimmed());
    }
    println!("{:<9}{:<12}{:<12}{:<12}{:<12}", "", "Year", "Month", "Day", "Hour");
    let row = |label: &str, cells: [String; 4]| {
        println!("{:<9}{:<12}{:<12}{:<12}{:<12}", label, cells[0], cells[1], cells[2], cells[3]);
    };
    let [y, m, d, h] = chart.pillars();
    row("Stem", [y, m, d, h].map(|p| p.gan.to_string()));
    row("Branch", [y, m, d, h].map(|p| p.zhi.to_string()));
    row("Element", [y, m, d, h].map(|p| p.element.label()));
    println!();
    println!("Eight characters: {}", chart.eight_characters().cyan().bold());
    println!(
        "Day master:       {} {}",
        chart.day_master,
        chart.day_master_element.label()
    );
    println!("Zodiac:           {} ({})", chart.zodiac, chart.zodiac.chinese());
}

fn solar_date(date: &CivilDate) -> Result<chrono::NaiveDate> {
    chrono::NaiveDate::from_ymd_opt(date.year, date.month, date.day).ok_or_else(|| eyre!("Invalid date: {}", date))
}
