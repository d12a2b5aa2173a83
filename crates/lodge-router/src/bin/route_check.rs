//! `lodge-route-check`：CI 阶段校验路由表并试解析样例路径的命令行工具。
//!
//! # 使用方法
//! ```bash
//! cargo run -p lodge-router --features cli --bin lodge-route-check -- routes/hotel.toml \
//!     --role customer --identity ada@lodge.example /CustomerHome/ada@lodge.example /OwnerHome/x
//! ```
//! - 第一个参数为路由表路径，传 `--builtin` 时使用随 crate 发布的酒店路由表；
//! - `--role` / `--identity`：可选，试解析时使用的会话，默认访客；
//! - 其余参数为待试解析的路径，逐条经过完整的导航流程。
//!
//! # 设计要点（Why）
//! - 路由表装载失败即以非零状态码退出，带冲突的路由表不得发布；
//! - 日志经 `tracing-subscriber` 输出到标准错误，级别由 `RUST_LOG` 控制。

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use lodge_core::{Role, Session};
use lodge_router::{
    Disposition, NavigationEvent, Navigator, NavigatorConfig, RecordingHistory, RouteRegistry,
    config, hotel,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("lodge-route-check: {message}");
            ExitCode::FAILURE
        }
    }
}

struct Options {
    table: Option<PathBuf>,
    role: Role,
    identity: Option<String>,
    paths: Vec<String>,
}

fn usage(reason: &str) -> String {
    format!(
        "{reason}\nusage: lodge-route-check <routes.toml|--builtin> \
         [--role <role>] [--identity <id>] [path ...]"
    )
}

fn parse_args() -> Result<Options, String> {
    let mut args = env::args().skip(1);
    let table = match args.next().as_deref() {
        Some("--builtin") => None,
        Some(path) => Some(PathBuf::from(path)),
        None => return Err(usage("missing route table")),
    };

    let mut options = Options {
        table,
        role: Role::Public,
        identity: None,
        paths: Vec::new(),
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--role" => {
                let value = args.next().ok_or_else(|| usage("--role requires a value"))?;
                options.role = value.parse().map_err(|err| usage(&err.to_string()))?;
            }
            "--identity" => {
                let value = args
                    .next()
                    .ok_or_else(|| usage("--identity requires a value"))?;
                options.identity = Some(value);
            }
            _ => options.paths.push(arg),
        }
    }
    Ok(options)
}

fn run() -> Result<(), String> {
    let options = parse_args()?;

    let loaded = match &options.table {
        Some(path) => config::read_route_table(path),
        None => hotel::registry(),
    };
    let registry = loaded.map_err(|err| {
        error!(code = err.code(), %err, "route table rejected");
        format!("route table rejected [{}]: {err}", err.code())
    })?;

    print_table(&registry);
    if options.paths.is_empty() {
        return Ok(());
    }

    let session = match (options.role, options.identity) {
        (Role::Public, _) | (_, None) => Session::anonymous(),
        (role, Some(identity)) => Session::signed_in(role, identity),
    };
    println!();
    println!("resolving as {}", session.role());

    let mut navigator = Navigator::new(
        Arc::new(registry),
        NavigatorConfig::default(),
        session,
        RecordingHistory::new(),
    );
    for path in options.paths {
        let committed = navigator.navigate(NavigationEvent::push(path.as_str()));
        let screen = committed.screen().map(|screen| screen.as_str()).unwrap_or("-");
        let outcome = match committed.disposition() {
            Disposition::Rendered => String::from("rendered"),
            Disposition::NotFound(cause) => format!("not found ({})", cause.code()),
            Disposition::Redirected(cause) => format!("redirected ({})", cause.code()),
            Disposition::Unchanged => String::from("unchanged"),
        };
        println!("{path:<72} {outcome:<32} -> {screen}");
    }
    Ok(())
}

fn print_table(registry: &RouteRegistry) {
    for pattern in registry.iter() {
        let home = registry.home(pattern.role()).template() == pattern.template();
        println!(
            "{:<9} {:<76} {}{}",
            pattern.role().as_str(),
            pattern.template(),
            pattern.target(),
            if home { " (home)" } else { "" }
        );
    }
    for link in registry.links() {
        let carried: Vec<String> = link
            .carried()
            .iter()
            .map(|carry| {
                if carry.source() == carry.target() {
                    carry.source().to_owned()
                } else {
                    format!("{}->{}", carry.source(), carry.target())
                }
            })
            .collect();
        println!(
            "link {:<18} {} -> {} carries [{}]",
            link.workflow(),
            link.from(),
            link.to(),
            carried.join(", ")
        );
    }
}
