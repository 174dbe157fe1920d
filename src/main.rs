use clap::{App, Arg, ArgMatches};
use log::{debug, error};
use serde::Serialize;
use std::error::Error;
use std::process::exit;

use shaderpp::logger;
use shaderpp::{Config, ParseCache, Preprocessor, Source};

/// What `--json` prints.
#[derive(Serialize)]
struct Report<'a> {
  stages: &'a [Source],
  includes: Vec<&'a str>,
}

fn main() {
  let options = App::new(env!("CARGO_PKG_NAME"))
    .version(env!("CARGO_PKG_VERSION"))
    .about(env!("CARGO_PKG_DESCRIPTION"))
    .arg(Arg::with_name("config")
         .short("c")
         .long("config")
         .takes_value(true)
         .value_name("FILE")
         .help("JSON configuration file"))
    .arg(Arg::with_name("res-path")
         .short("r")
         .long("res-path")
         .takes_value(true)
         .value_name("DIR")
         .help("Resource root substituted for ENGINE_RES_PATH"))
    .arg(Arg::with_name("json")
         .long("json")
         .conflicts_with("deps")
         .help("Print stages and include chain as JSON"))
    .arg(Arg::with_name("deps")
         .long("deps")
         .help("Only print the files the program is made of"))
    .arg(Arg::with_name("verbose")
         .short("v")
         .multiple(true)
         .help("More logs; repeat for more"))
    .arg(Arg::with_name("FILE")
         .required(true)
         .index(1)
         .help("Entry shader source"))
    .get_matches();

  if let Err(e) = logger::init(logger::level_from_verbosity(options.occurrences_of("verbose"))) {
    eprintln!("cannot install logger: {}", e);
  }

  if let Err(e) = run(&options) {
    error!("{}", e);
    exit(1);
  }
}

fn run(options: &ArgMatches) -> Result<(), Box<dyn Error>> {
  let mut config = match options.value_of("config") {
    Some(path) => Config::from_json_file(path)?,
    None => Config::default(),
  };

  if let Some(res_path) = options.value_of("res-path") {
    config.res_path = res_path.to_owned();
  }

  let path = options.value_of("FILE").ok_or("missing shader source")?;
  let preprocessor = Preprocessor::new(config);

  // one cache for this program only; it goes away with this function
  let mut cache = ParseCache::new();
  let parser = preprocessor.parser(path, &mut cache)?;

  debug!("reading {} (resource root: {})", parser.path(), preprocessor.config().res_path);

  let stages = parser.collect::<Result<Vec<_>, _>>()?;

  if stages.is_empty() {
    return Err(format!("{} has no #shader stage", path).into());
  }

  if options.is_present("deps") {
    for include in cache.includes() {
      println!("{}", include);
    }
  } else if options.is_present("json") {
    let report = Report {
      stages: &stages,
      includes: cache.includes().collect(),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    for stage in &stages {
      let uniforms = stage.uniform_names().collect::<Vec<_>>();

      println!("// {} stage, uniforms: [{}]", stage.stage(), uniforms.join(", "));
      print!("{}", stage.text());
    }
  }

  Ok(())
}
