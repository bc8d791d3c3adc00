use pretty_assertions::assert_eq;

use crate::errors::ErrorCode;
use crate::logging::{Log, LogLevel, LogSink};
use crate::options::{CompileOptions, ExecOptions};
use crate::priority::{resolve, Engine, Priority, ENGINE_COUNT};

use Engine::*;

fn priority(engines: &[Engine]) -> Priority {
    Priority::new(engines).unwrap()
}

fn resolve_engines(engines: &[Engine]) -> Result<Priority, ErrorCode> {
    resolve(
        Some(&priority(engines)),
        b"abc",
        CompileOptions::none(),
        ExecOptions::none(),
        None,
    )
}

#[test]
fn default_priority() {
    assert_eq!(Priority::default().engines(), &[Automata, PcreJit, Pcre]);
    assert_eq!(Priority::default().validate(None), Ok(()));
    assert_eq!(
        resolve(None, b"abc", CompileOptions::none(), ExecOptions::none(), None),
        Ok(Priority::default())
    );
}

#[test]
fn valid_priorities() {
    for engines in [
        &[Pcre][..],
        &[PcreJit],
        &[Pcre, PcreJit, Automata],
        &[Automata, Pcre],
        &[Automata, PcreJit, Pcre],
        &[PcreJit, Automata],
        &[Auto],
    ] {
        assert_eq!(priority(engines).validate(None), Ok(()), "{:?}", engines);
    }
}

#[test]
fn empty_priority() {
    assert_eq!(
        priority(&[]).validate(None),
        Err(ErrorCode::InvalidPriorityLength)
    );
}

#[test]
fn too_long_priority() {
    assert_eq!(
        Priority::new(&[Pcre, PcreJit, Automata, Pcre, PcreJit]),
        Err(ErrorCode::InvalidPriorityLength)
    );
    assert_eq!(
        Priority::new(&[Pcre, PcreJit, Automata, Pcre]).map(|p| p.len()),
        Ok(ENGINE_COUNT)
    );
}

#[test]
fn automata_needs_backtracking_fallback() {
    for engines in [
        &[Automata][..],
        &[Automata, Automata],
        &[Automata, Auto],
        &[Automata, Automata, Pcre],
    ] {
        assert_eq!(
            priority(engines).validate(None),
            Err(ErrorCode::InvalidPriorityAutomata),
            "{:?}",
            engines
        );
    }
}

#[test]
fn auto_must_be_alone() {
    for engines in
        [&[Auto, Pcre][..], &[Pcre, Auto], &[PcreJit, Pcre, Auto], &[Auto, Auto]]
    {
        assert_eq!(
            priority(engines).validate(None),
            Err(ErrorCode::InvalidPriorityAuto),
            "{:?}",
            engines
        );
    }
}

#[test]
fn auto_is_not_supported() {
    assert_eq!(resolve_engines(&[Auto]), Err(ErrorCode::NotSupported));
}

#[test]
fn resolve_returns_requested() {
    assert_eq!(resolve_engines(&[Pcre, Automata]), Ok(priority(&[Pcre, Automata])));
    assert_eq!(
        resolve_engines(&[Automata]),
        Err(ErrorCode::InvalidPriorityAutomata)
    );
}

#[test]
fn validation_errors_are_logged() {
    let sink = LogSink::new(LogLevel::Error);
    let mut log = Log::with_sink(&sink);

    assert!(priority(&[Pcre, Auto]).validate(Some(&mut log)).is_err());
    assert_eq!(
        log.message().as_deref(),
        Some(ErrorCode::InvalidPriorityAuto.message())
    );
}

#[test]
fn parse_priority() {
    assert_eq!("automata, pcre-jit".parse(), Ok(priority(&[Automata, PcreJit])));
    assert_eq!("pcre".parse(), Ok(priority(&[Pcre])));
    assert!("pcre,foo".parse::<Priority>().is_err());
    assert!("pcre,pcre,pcre,pcre,pcre".parse::<Priority>().is_err());
    assert_eq!(priority(&[Automata, Pcre]).to_string(), "[automata, pcre]");
}
