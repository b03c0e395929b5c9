//! Thin `fern` dispatcher gated by `TINYSQL_LOG`, mirroring the teacher's
//! `sqruff-cli-lib::logger` (which gates on `SQRUFF_LOG`). The engine itself
//! never logs (spec §7); only this host does.

pub(crate) fn init() -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!("[{}] {}", record.level(), message)))
        .level(
            std::env::var("TINYSQL_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(log::LevelFilter::Off),
        )
        .chain(std::io::stderr())
        .apply()
}
