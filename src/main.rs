// exprtree: draw a C expression's parse tree as SVG

use clap::Parser;

use exprtree::parser::parse_with_typenames;
use exprtree::render::expr_to_svg;

/// Parse a C expression and print its tree drawing as SVG on stdout.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// The expression to draw, e.g. "a ? f(b) : c[0]"
    expression: String,

    /// Extra identifiers to treat as type-name first words for typecast
    /// disambiguation, comma separated
    #[arg(long, value_delimiter = ',')]
    typenames: Vec<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let typenames: Vec<&str> = args.typenames.iter().map(String::as_str).collect();

    match parse_with_typenames(&args.expression, &typenames) {
        Ok(tree) => print!("{}", expr_to_svg(&tree)),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
