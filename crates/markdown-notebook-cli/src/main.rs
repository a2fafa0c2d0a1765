use std::process;

fn main() {
    match markdown_notebook_cli::run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("markdown-notebook error: {err:#}");
            process::exit(1);
        }
    }
}
