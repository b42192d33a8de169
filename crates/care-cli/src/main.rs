//! `care-survey` - command-line front end for the CARE Journal Likert survey

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context};
use care_core::{
    FormSession, LikertRating, QuestionId, SurveyType, SURVEY_AUDIENCE, SURVEY_TITLE,
};
use care_store::{StoreConfig, SurveyStore};
use chrono::{Local, NaiveDate};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

fn cli() -> Command {
    Command::new("care-survey")
        .version(env!("CARGO_PKG_VERSION"))
        .about("CARE Journal Likert-scale survey for Community Health Visitors")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML file with store settings"),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Directory for record files and the shared log"),
        )
        .subcommand(
            Command::new("questions")
                .about("Show the questionnaire")
                .arg(survey_type_arg()),
        )
        .subcommand(
            Command::new("submit")
                .about("Submit one response")
                .arg(survey_type_arg())
                .arg(
                    Arg::new("code")
                        .long("code")
                        .default_value("")
                        .help("Unique code matching your pre and post responses, e.g. MN30"),
                )
                .arg(
                    Arg::new("date")
                        .long("date")
                        .value_parser(value_parser!(NaiveDate))
                        .help("Survey date (YYYY-MM-DD), defaults to today"),
                )
                .arg(
                    Arg::new("ratings")
                        .long("ratings")
                        .default_value("")
                        .help("Comma-separated ratings 1-5 in question order; omitted ones keep the default"),
                )
                .arg(
                    Arg::new("text")
                        .long("text")
                        .default_value("")
                        .help("Answer to the open-ended question"),
                )
                .arg(
                    Arg::new("show")
                        .long("show")
                        .action(ArgAction::SetTrue)
                        .help("Print the saved record as a responses summary"),
                )
                .arg(
                    Arg::new("download")
                        .long("download")
                        .value_parser(value_parser!(PathBuf))
                        .help("Also write a copy of the saved record here"),
                ),
        )
        .subcommand(
            Command::new("log")
                .about("Print the shared response log")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}

fn survey_type_arg() -> Arg {
    Arg::new("type")
        .long("type")
        .default_value("pre")
        .value_parser(|s: &str| s.parse::<SurveyType>().map_err(|e| e.to_string()))
        .help("pre or post")
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<StoreConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => StoreConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => StoreConfig::new(),
    };
    if let Some(dir) = matches.get_one::<PathBuf>("output-dir") {
        config = config.with_output_dir(dir);
    }
    Ok(config)
}

/// Parse `3,4,,5` into positional ratings; blanks keep the default
fn parse_ratings(raw: &str, survey_type: SurveyType) -> anyhow::Result<Vec<(QuestionId, LikertRating)>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() > survey_type.question_count() {
        bail!(
            "{} has {} questions, got {} ratings",
            survey_type,
            survey_type.question_count(),
            parts.len()
        );
    }
    survey_type
        .question_ids()
        .zip(parts)
        .filter(|(_, p)| !p.is_empty())
        .map(|(id, p)| {
            let value: u8 = p
                .parse()
                .map_err(|_| anyhow!("{id}: {p:?} is not a number"))?;
            Ok((id, LikertRating::new(value).with_context(|| id.to_string())?))
        })
        .collect()
}

fn print_questions(store: &SurveyStore, survey_type: SurveyType) {
    if let Some(logo) = store.branding() {
        println!("[logo: {} ({} bytes)]", logo.path.display(), logo.len());
    }
    println!("{SURVEY_TITLE}");
    println!("{SURVEY_AUDIENCE}");
    println!();
    println!("{survey_type}");
    println!();
    println!("Rating Scale:");
    for point in LikertRating::scale() {
        println!("  {point}");
    }
    println!();
    for (id, statement) in care_core::Catalog::entries(survey_type) {
        println!("{}. {}", id.index(), statement);
    }
    println!();
    println!("Open-ended: {}", survey_type.open_prompt());
}

fn submit(store: &SurveyStore, args: &ArgMatches) -> anyhow::Result<()> {
    let survey_type = *args
        .get_one::<SurveyType>("type")
        .ok_or_else(|| anyhow!("missing --type"))?;
    let today = Local::now().date_naive();

    let mut form = FormSession::new(survey_type, today);
    if let Some(date) = args.get_one::<NaiveDate>("date") {
        form.set_survey_date(*date);
    }
    form.set_respondent_code(args.get_one::<String>("code").cloned().unwrap_or_default());
    form.set_free_text(args.get_one::<String>("text").cloned().unwrap_or_default());

    let raw = args.get_one::<String>("ratings").map_or("", String::as_str);
    for (id, rating) in parse_ratings(raw, survey_type)? {
        form.set_rating(id, rating)?;
    }

    let receipt = store
        .submit_now(&mut form)
        .map_err(|e| anyhow!(e.user_message()))?;
    println!("{}", receipt.confirmation());

    if args.get_flag("show") {
        println!();
        println!("{}", responses_summary(receipt.download_bytes())?);
    }

    if let Some(path) = args.get_one::<PathBuf>("download") {
        std::fs::write(path, receipt.download_bytes())
            .with_context(|| format!("writing download copy to {}", path.display()))?;
        println!("Download copy written to {}", path.display());
    }
    Ok(())
}

/// The saved record, as shown under "View Your Responses Summary"
fn responses_summary(json: &[u8]) -> anyhow::Result<String> {
    let body = std::str::from_utf8(json).context("record is not UTF-8")?;
    Ok(format!("View Your Responses Summary\n{body}"))
}

fn print_log(store: &SurveyStore, json: bool) -> anyhow::Result<()> {
    let rows = store.log().read_rows()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    println!("{} rows in {}", rows.len(), store.log().path().display());
    for row in &rows {
        let ratings: Vec<String> = row.ratings.iter().map(|(id, v)| format!("{id}={v}")).collect();
        println!(
            "{} | {} | {} | {} | {}",
            row.submission_timestamp,
            row.survey_type,
            row.unique_code,
            ratings.join(" "),
            row.open_ended_response
        );
    }
    Ok(())
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let config = load_config(matches)?;
    if let Some((name, _)) = matches.subcommand() {
        tracing::info!("Running {} against {}", name, config.output_dir.display());
    }

    match matches.subcommand() {
        Some(("questions", args)) => {
            let store = SurveyStore::new(config)?;
            let survey_type = *args
                .get_one::<SurveyType>("type")
                .ok_or_else(|| anyhow!("missing --type"))?;
            print_questions(&store, survey_type);
        }
        Some(("submit", args)) => {
            // The store creates the output directory once the form validates.
            let store = SurveyStore::new(config)?;
            submit(&store, args)?;
        }
        Some(("log", args)) => {
            let store = SurveyStore::new(config)?;
            print_log(&store, args.get_flag("json"))?;
        }
        _ => {}
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let matches = cli().get_matches();

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("care-survey failed: {:#}", e);
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
