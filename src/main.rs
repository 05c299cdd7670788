use clap::{Parser, ValueEnum};
use jsse_closure::ast::{
    Expression, FunctionDefinition, Literal, Pattern, Statement, is_identifier_name,
};
use jsse_closure::interpreter::Closure;
use jsse_closure::types::JsObject;
use jsse_closure::{EngineConfig, Interpreter};
use std::process::ExitCode;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "jsse-closure",
    version,
    about = "Instantiate JavaScript function expressions and inspect the closures"
)]
struct Cli {
    /// Binding name of the function expression; omit for an anonymous one
    #[arg(short, long)]
    name: Option<String>,

    #[arg(short, long, value_enum, default_value_t = Kind::Ordinary)]
    kind: Kind,

    /// Formal parameter: `a`, `b=` for one with a default, `...rest`
    #[arg(short, long = "param")]
    params: Vec<String>,

    /// Give the body a "use strict" directive
    #[arg(long)]
    strict: bool,

    /// Evaluate as if the enclosing script were strict mode code
    #[arg(long)]
    script_strict: bool,

    /// How many closures to create from the same definition
    #[arg(short, long, default_value_t = 1)]
    count: usize,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Ordinary,
    Async,
    Generator,
    AsyncGenerator,
}

impl Kind {
    fn flags(self) -> (bool, bool) {
        match self {
            Kind::Ordinary => (false, false),
            Kind::Async => (true, false),
            Kind::Generator => (false, true),
            Kind::AsyncGenerator => (true, true),
        }
    }
}

fn init_logging(config: &EngineConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_param(text: &str) -> Result<Pattern, String> {
    let (rest, text) = match text.strip_prefix("...") {
        Some(name) => (true, name),
        None => (false, text),
    };
    let (name, defaulted) = match text.strip_suffix('=') {
        Some(name) => (name, true),
        None => (text, false),
    };
    if !is_identifier_name(name) {
        return Err(format!("invalid parameter name '{name}'"));
    }
    let pattern = Pattern::Identifier(name.to_string());
    Ok(match (rest, defaulted) {
        (true, true) => return Err(format!("rest parameter '{name}' cannot have a default")),
        (true, false) => Pattern::Rest(Box::new(pattern)),
        (false, true) => Pattern::Assign(
            Box::new(pattern),
            Box::new(Expression::Literal(Literal::Null)),
        ),
        (false, false) => pattern,
    })
}

fn build_definition(cli: &Cli) -> Result<FunctionDefinition, String> {
    if let Some(name) = &cli.name
        && !is_identifier_name(name)
    {
        return Err(format!("invalid function name '{name}'"));
    }
    let params = cli
        .params
        .iter()
        .map(|p| parse_param(p))
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(pos) = params.iter().position(|p| matches!(p, Pattern::Rest(_)))
        && pos + 1 != params.len()
    {
        return Err("rest parameter must be last".to_string());
    }
    let body = if cli.strict {
        vec![Statement::Expression(Expression::Literal(Literal::String(
            "use strict".to_string(),
        )))]
    } else {
        vec![]
    };
    let (is_async, is_generator) = cli.kind.flags();
    Ok(FunctionDefinition::new(cli.name.clone(), params, body, is_async, is_generator))
}

fn engine_config(cli: &Cli) -> EngineConfig {
    EngineConfig::default()
        .strict(cli.script_strict)
        .log_filter(cli.log.clone())
}

fn describe(interp: &Interpreter, closure: &Closure) -> String {
    let id = |obj: Option<JsObject>| match obj {
        Some(o) => format!("#{}", o.id),
        None => "-".to_string(),
    };
    let mut line = format!(
        "#{} {:?} length={} species={:?} this={:?} strict={} constructor={} prototype={} [[Prototype]]={}",
        closure.object().id,
        closure.name().to_rust_string(),
        closure.length(),
        closure.species(),
        closure.this_mode(),
        closure.is_strict(),
        closure.is_constructor(),
        id(closure.prototype_property()),
        id(closure.get_prototype_of()),
    );
    if let Some(proto) = closure.prototype_property()
        && let Some(data) = interp.heap().get(proto)
    {
        let parent = data.borrow().prototype.as_ref().and_then(|p| p.borrow().object());
        line.push_str(&format!(" prototype.[[Prototype]]={}", id(parent)));
    }
    line
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = engine_config(cli);
    init_logging(&config);

    let definition = Rc::new(build_definition(cli)?);
    let mut interp = Interpreter::with_config(&config).map_err(|e| e.to_string())?;
    for _ in 0..cli.count {
        let closure = interp
            .instantiate_function_expression(&definition)
            .map_err(|e| e.to_string())?;
        println!("{}", describe(&interp, &closure));
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}
