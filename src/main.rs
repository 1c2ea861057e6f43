use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use indicatif::{ProgressBar, ProgressStyle};
use serde_derive::Serialize;
use tracing::{debug, info};

use plsa::{ConvergenceMetric, Corpus, CorpusBuilder, FitObserver, FittedModel, PlsaConfig, Topic};

/// Reads one document per line, tokens separated by whitespace.
/// Blank lines are skipped and do not count towards `max_documents`.
fn load_documents<R: BufRead>(reader: R, max_documents: Option<usize>) -> Result<Corpus> {
    let mut builder = CorpusBuilder::new();
    let mut docs = 0;
    for (n, line) in reader.lines().enumerate() {
        if max_documents.map_or(false, |max| docs >= max) {
            break;
        }
        let line = line.with_context(|| format!("Failed to read line {}", n + 1))?;
        if line.trim().is_empty() {
            debug!(line = n + 1, "Skipping blank line");
            continue;
        }
        builder.add_document(line.split_whitespace());
        docs += 1;
    }
    Ok(builder.build())
}

fn open_input(path: &str) -> Result<Box<dyn BufRead>> {
    if path == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path).with_context(|| format!("Can't read file {}", path))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Spinner on stderr showing the iteration count and the metric delta.
struct Progress {
    bar: ProgressBar,
}

impl FitObserver for Progress {
    fn on_start(&mut self, metric: f64) {
        self.bar.set_message(format!("metric = {:.4}", metric));
    }

    fn on_iteration(&mut self, iteration: usize, metric: f64, delta: f64) {
        self.bar.set_position(iteration as u64);
        self.bar.set_message(format!("metric = {:.4}, delta = {:.4}", metric, delta));
    }

    fn on_finish(&mut self, iterations: usize, metric: f64) {
        self.bar.finish_with_message(format!("converged after {} iterations (metric = {:.4})", iterations, metric));
    }
}

#[derive(Serialize)]
struct Report<'a> {
    config: &'a PlsaConfig,
    iterations: usize,
    metric: f64,
    topics: Vec<Topic>,
}

fn print_topics<W: Write>(out: &mut W, topics: &[Topic], with_probabilities: bool) -> io::Result<()> {
    for topic in topics {
        write!(out, "Topic {}:", topic.index)?;
        for w in &topic.words {
            if with_probabilities {
                write!(out, " {:.6}*{}", w.probability, w.word)?;
            }
            else {
                write!(out, " {}", w.word)?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_report(model: &FittedModel, config: &PlsaConfig, matches: &ArgMatches) -> Result<()> {
    let topics = model.topics();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if matches.get_flag("json") {
        let report = Report {
            config: config,
            iterations: model.iterations(),
            metric: model.metric(),
            topics: topics,
        };
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    }
    else {
        print_topics(&mut out, &topics, matches.get_flag("probabilities"))?;
    }
    Ok(())
}

fn cli() -> Command {
    Command::new("plsa")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Probabilistic latent semantic analysis fitted by expectation-maximization")
        .arg(Arg::new("topics")
             .long("topics")
             .value_name("NUMBER")
             .required(true)
             .value_parser(value_parser!(usize))
             .help("Set the number of topics"))
        .arg(Arg::new("top-n")
             .long("top-n")
             .value_name("NUMBER")
             .default_value("10")
             .value_parser(value_parser!(usize))
             .help("Set the number of words reported per topic"))
        .arg(Arg::new("threshold")
             .long("threshold")
             .value_name("DELTA")
             .default_value("0.1")
             .value_parser(value_parser!(f64))
             .help("Stop once the metric changes by no more than DELTA"))
        .arg(Arg::new("max-iterations")
             .long("max-iterations")
             .value_name("NUMBER")
             .value_parser(value_parser!(usize))
             .help("Fail if the model has not converged after NUMBER iterations"))
        .arg(Arg::new("metric")
             .long("metric")
             .value_name("METRIC")
             .value_parser(["weighted-agreement", "log-likelihood"])
             .default_value("weighted-agreement")
             .help("Specify the convergence metric"))
        .arg(Arg::new("seed")
             .long("seed")
             .value_name("NUMBER")
             .value_parser(value_parser!(u64))
             .help("Seed the random initialization"))
        .arg(Arg::new("max-documents")
             .long("max-documents")
             .value_name("NUMBER")
             .value_parser(value_parser!(usize))
             .help("Read at most NUMBER documents from the input"))
        .arg(Arg::new("probabilities")
             .long("probabilities")
             .action(ArgAction::SetTrue)
             .help("Print word probabilities next to each word"))
        .arg(Arg::new("json")
             .long("json")
             .action(ArgAction::SetTrue)
             .help("Print topics as JSON"))
        .arg(Arg::new("quiet")
             .long("quiet")
             .short('q')
             .action(ArgAction::SetTrue)
             .help("Hide the progress spinner"))
        .arg(Arg::new("INPUT")
             .default_value("-")
             .help("Normalized documents, one per line with whitespace-separated tokens; blank lines are skipped (`-` for stdin)"))
}

fn config_from(matches: &ArgMatches) -> Result<PlsaConfig> {
    let topics = matches.get_one::<usize>("topics").copied().context("--topics is required")?;
    let metric: ConvergenceMetric = matches
        .get_one::<String>("metric")
        .map_or(Ok(ConvergenceMetric::default()), |s| s.parse())?;

    let mut config = PlsaConfig::new(topics).metric(metric);
    if let Some(&n) = matches.get_one::<usize>("top-n") {
        config = config.top_n_words(n);
    }
    if let Some(&threshold) = matches.get_one::<f64>("threshold") {
        config = config.convergence_threshold(threshold);
    }
    if let Some(&n) = matches.get_one::<usize>("max-iterations") {
        config = config.max_iterations(n);
    }
    if let Some(&seed) = matches.get_one::<u64>("seed") {
        config = config.seed(seed);
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("plsa=info")),
        )
        .with_writer(io::stderr)
        .init();

    let matches = cli().get_matches();
    let config = config_from(&matches)?;

    let input = matches.get_one::<String>("INPUT").map_or("-", String::as_str);
    info!(input = input, "Building corpus");
    let corpus = load_documents(open_input(input)?, matches.get_one::<usize>("max-documents").copied())?;

    let bar = if matches.get_flag("quiet") {
        ProgressBar::hidden()
    }
    else {
        ProgressBar::new_spinner()
    };
    bar.set_style(ProgressStyle::with_template("{spinner} Iteration {pos}: {msg}")?);
    let mut progress = Progress { bar: bar };

    let model = match plsa::fit(&corpus, config.clone(), &mut progress) {
        Ok(model) => model,
        Err(e) => {
            progress.bar.abandon();
            return Err(e).context("Fitting the pLSA model failed");
        }
    };

    write_report(&model, &config, &matches)
}
