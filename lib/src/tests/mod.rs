/*! End-to-end tests. */
use pretty_assertions::assert_eq;

use crate::{
    compile, error_message, init, release, CompileOption, CompileOptions,
    Engine, ErrorCode, ExecOption, ExecOptions, Log, LogLevel, LogSink,
    MatchResult, Params, PcreLimits, Priority, Regex, SUCCESS,
};

/// Compiles `$pattern`, executes it on `$subject` with a vector of
/// `$capacity` elements, and checks both the result and the captured
/// pairs.
macro_rules! test_exec {
    ($pattern:expr, $subject:expr, $capacity:expr, $expected:expr, $pairs:expr) => {{
        test_exec!(
            $pattern,
            CompileOptions::none(),
            ExecOptions::none(),
            $subject,
            $capacity,
            $expected,
            $pairs
        )
    }};
    ($pattern:expr, $compile_options:expr, $exec_options:expr, $subject:expr, $capacity:expr, $expected:expr, $pairs:expr) => {{
        let re = compile($pattern, $compile_options, None, None, None).unwrap();
        let mut captures = vec![0; $capacity];
        let pairs: &[i32] = $pairs;

        assert_eq!(
            re.exec(
                $subject,
                0,
                $exec_options,
                None,
                Some(&mut captures),
                None
            ),
            MatchResult::from_raw($expected),
            "\n\n`{}` on {:?}",
            String::from_utf8_lossy($pattern),
            String::from_utf8_lossy($subject),
        );

        assert_eq!(&captures[..pairs.len()], pairs);
    }};
}

/// Checks that every priority in `$priorities` produces the same verdict
/// for `$pattern` on each of `$subjects`.
macro_rules! test_parity {
    ($pattern:expr, $options:expr, [$($subject:expr),+]) => {{
        let re = compile($pattern, $options, None, None, None).unwrap();
        for subject in [$(&$subject[..]),+] {
            let verdicts: Vec<bool> = [
                &[Engine::Automata, Engine::PcreJit, Engine::Pcre][..],
                &[Engine::Pcre],
                &[Engine::PcreJit],
                &[Engine::Automata, Engine::Pcre],
            ]
            .iter()
            .map(|engines| {
                let priority = Priority::new(engines).unwrap();
                let result = re.exec(
                    subject,
                    0,
                    ExecOptions::none(),
                    Some(&priority),
                    None,
                    None,
                );
                assert!(!result.is_error(), "{}", result);
                result.is_match()
            })
            .collect();

            assert!(
                verdicts.iter().all(|v| *v == verdicts[0]),
                "\n\n`{}` on {:?}: {:?}",
                String::from_utf8_lossy($pattern),
                String::from_utf8_lossy(subject),
                verdicts,
            );
        }
    }};
}

#[test]
fn literal() {
    test_exec!(b"abc", b"abc", 3, 1, &[0, 3]);
    test_exec!(b"abc", b"xxabcxx", 30, 1, &[2, 5, 0, 0]);
    test_exec!(b"abc", b"ab", 30, -1, &[0, 0]);
}

#[test]
fn groups() {
    test_exec!(
        b"(a+b)(c+d)(e+f)",
        b"abcdef",
        30,
        4,
        &[0, 6, 0, 2, 2, 4, 4, 6]
    );
    test_exec!(b"(a)|(b)", b"b", 30, 3, &[0, 1, -1, -1, 0, 1]);
    test_exec!(b"(a)|(b)", b"a", 30, 2, &[0, 1, 0, 1]);
    test_exec!(b"(x)?abc", b"abc", 30, 1, &[0, 3]);
}

#[test]
fn capture_vector_too_small() {
    let pattern = b"(a?)(b?)(c?)(d?)(e?)(f?)(g?)(h?)(i?)(j?)(k?)";

    test_exec!(pattern, b"abcdefghijk", 30, 0, &[0, 11, 0, 1, 1, 2]);
    test_exec!(pattern, b"abcdefghijk", 36, 12, &[0, 11, 0, 1, 1, 2]);

    // Without room even for the whole match.
    test_exec!(b"abc", b"abc", 2, 0, &[0, 0]);
}

#[test]
fn empty_match_rejected() {
    let not_empty = ExecOptions::none() | ExecOption::NotEmpty;

    test_exec!(
        b"a?b?c?d?e?",
        CompileOptions::none(),
        not_empty,
        b"ffff",
        30,
        -1,
        &[0, 0]
    );
    test_exec!(
        b"a?b?c?d?e?",
        CompileOptions::none(),
        ExecOptions::none(),
        b"ffff",
        30,
        1,
        &[0, 0]
    );
    test_exec!(
        b"x*",
        CompileOptions::none(),
        not_empty,
        b"abxxc",
        3,
        1,
        &[2, 4]
    );
}

#[test]
fn compile_options() {
    let options = CompileOptions::none()
        | CompileOption::Multiline
        | CompileOption::Caseless;

    test_exec!(b"b$", options, ExecOptions::none(), b"b\nb", 30, 1, &[0, 1]);
    test_exec!(
        b"^B",
        options,
        ExecOptions::none(),
        b"a\nb",
        30,
        1,
        &[2, 3]
    );
    test_exec!(
        b"a.c",
        CompileOptions::none() | CompileOption::Dotall,
        ExecOptions::none(),
        b"a\nc",
        30,
        1,
        &[0, 3]
    );
    test_exec!(
        b"a.c",
        CompileOptions::none(),
        ExecOptions::none(),
        b"a\nc",
        30,
        -1,
        &[]
    );
    test_exec!(
        b"b$",
        CompileOptions::none() | CompileOption::DollarEndOnly,
        ExecOptions::none(),
        b"b\n",
        30,
        -1,
        &[]
    );
    test_exec!(
        b"b$",
        CompileOptions::none(),
        ExecOptions::none(),
        b"b\n",
        30,
        1,
        &[0, 1]
    );
}

#[test]
fn binary_subjects() {
    test_exec!(b"\x00\xff+", b"a\x00\xff\xffb", 3, 1, &[1, 4]);
    test_exec!(b"[\x80-\xff]+", b"abc\x80\x90z", 3, 1, &[3, 5]);
}

#[test]
fn start_offset() {
    let re = Regex::new("abc").unwrap();
    let mut captures = [0; 3];

    for engines in [&[Engine::Automata, Engine::Pcre][..], &[Engine::Pcre]] {
        let priority = Priority::new(engines).unwrap();
        assert_eq!(
            re.exec(
                b"abcabc",
                1,
                ExecOptions::none(),
                Some(&priority),
                Some(&mut captures),
                None
            ),
            MatchResult::from_raw(1)
        );
        assert_eq!(&captures[..2], &[3, 6]);

        let result = re.exec(
            b"abc",
            4,
            ExecOptions::none(),
            Some(&priority),
            None,
            None,
        );
        assert!(result.is_error(), "{:?}", engines);
    }
}

#[test]
fn parity() {
    test_parity!(b"abc", CompileOptions::none(), [b"abc", b"xabcx", b"ab", b""]);
    test_parity!(
        b"^(GET|POST) /[a-z]+ HTTP/1\\.[01]$",
        CompileOptions::none(),
        [b"GET /index HTTP/1.1", b"PUT /index HTTP/1.1", b"GET /index HTTP/1.1\n"]
    );
    test_parity!(
        b"<script[^>]*>",
        CompileOptions::none() | CompileOption::Caseless,
        [b"<SCRIPT src=x>", b"<scrip>", b"a<script>"]
    );
    test_parity!(
        b"(?:union|select)\\s+\\w+",
        CompileOptions::none() | CompileOption::Caseless,
        [b"UNION  all", b"union", b"selectx"]
    );
    test_parity!(
        b"a?b?c?d?e?",
        CompileOptions::none(),
        [b"ffff", b"", b"abcde"]
    );
    test_parity!(
        b"^b",
        CompileOptions::none() | CompileOption::Multiline,
        [b"a\nb", b"ab"]
    );
    test_parity!(
        b"\\bword\\b",
        CompileOptions::none(),
        [b"a word here", b"awordb", b"word"]
    );
    test_parity!(b"[[a]]", CompileOptions::none(), [b"a", b"[a]]", b"a]"]);
    test_parity!(b"[a&&b]", CompileOptions::none(), [b"&", b"a", b"c"]);
    test_parity!(b"[a-c--b]", CompileOptions::none(), [b"b", b"-", b"d"]);
    test_parity!(b"[a~~b]", CompileOptions::none(), [b"~", b"b"]);
    test_parity!(b"\\v", CompileOptions::none(), [b"\n", b"\x0b", b"a"]);
    test_parity!(b"\\<a", CompileOptions::none(), [b"<a", b"a"]);
    test_parity!(b"[[:digit:]]+", CompileOptions::none(), [b"12", b"ab"]);
}

#[test]
fn divergent_syntax_skips_automata() {
    for pattern in [
        &b"[[a]]"[..],
        b"[a&&b]",
        b"[a-c--b]",
        b"\\v",
        b"\\<a",
        b"a$",
    ] {
        let re = Regex::new(pattern).unwrap();
        assert!(
            !re.is_compiled(Engine::Automata),
            "{}",
            String::from_utf8_lossy(pattern)
        );
        assert!(re.is_compiled(Engine::Pcre));
    }

    for pattern in [&b"[[:digit:]]+"[..], b"[a-c]-b", b"a&&b", b"a\\$"] {
        let re = Regex::new(pattern).unwrap();
        assert!(
            re.is_compiled(Engine::Automata),
            "{}",
            String::from_utf8_lossy(pattern)
        );
    }

    // PCRE's `[[a]]` is the class `[[a]` followed by a literal `]`.
    let re = Regex::new(b"[[a]]").unwrap();
    assert!(!re.is_match(b"a"));
    assert!(re.is_match(b"[]"));

    let re = Regex::new(b"\\v").unwrap();
    assert!(re.is_match(b"\n"));
}

#[test]
fn round_trip() {
    let patterns: &[&[u8]] = &[b"abc", b"(a+)(b*)", b"x?", b"(\\d+)\\.(\\d+)"];
    let subjects: &[&[u8]] = &[b"abc", b"aab", b"", b"v1.25", b"zzz"];

    for pattern in patterns {
        let first = Regex::new(pattern).unwrap();
        let second = Regex::new(pattern).unwrap();

        for subject in subjects {
            let mut captures_first = [-7; 12];
            let mut captures_second = [-7; 12];

            assert_eq!(
                first.exec(
                    subject,
                    0,
                    ExecOptions::none(),
                    None,
                    Some(&mut captures_first),
                    None
                ),
                second.exec(
                    subject,
                    0,
                    ExecOptions::none(),
                    None,
                    Some(&mut captures_second),
                    None
                ),
            );
            assert_eq!(captures_first, captures_second);
        }
    }
}

#[test]
fn limits() {
    let limits = PcreLimits::new(1000, 0);
    let re = compile(
        b"(a+)+$",
        CompileOptions::none(),
        None,
        Some(&Params::with_limits(limits)),
        None,
    )
    .unwrap();

    let subject = format!("{}b", "a".repeat(40));

    for engines in [&[Engine::Pcre][..], &[Engine::PcreJit]] {
        let result = re.exec(
            subject.as_bytes(),
            0,
            ExecOptions::none(),
            Some(&Priority::new(engines).unwrap()),
            None,
            None,
        );
        assert!(result.is_error(), "{:?}: {}", engines, result);
        assert_eq!(result.error_code(), None);
    }

    // Without limits the same match completes.
    let re = Regex::new("(a+)+$").unwrap();
    assert!(!re.is_match(b"aaaaaaaab"));
}

#[test]
fn logs() {
    init();

    let sink = LogSink::new(LogLevel::Debug);
    let mut log = Log::with_sink(&sink);

    assert!(compile(b"a)", CompileOptions::none(), None, None, Some(&mut log))
        .is_err());
    let message = log.message().unwrap().into_owned();
    assert!(message.ends_with("error offset = 1"), "{}", message);

    // Automata's failure is a warning, and compilation still succeeds.
    log.clear();
    assert!(compile(b"(a)\\1", CompileOptions::none(), None, None, Some(&mut log))
        .is_ok());
    assert!(
        log.message().unwrap().starts_with(ErrorCode::AutomataCannotConstruct.message())
    );

    // Skipping Automata for a construct it reads differently is a warning
    // with the plain message.
    log.clear();
    assert!(compile(b"[[a]]", CompileOptions::none(), None, None, Some(&mut log))
        .is_ok());
    assert_eq!(
        log.message().as_deref(),
        Some(ErrorCode::AutomataCannotConstruct.message())
    );

    // With the default threshold warnings are filtered out.
    let sink = LogSink::default();
    let mut log = Log::with_sink(&sink);
    assert!(compile(b"(a)\\1", CompileOptions::none(), None, None, Some(&mut log))
        .is_ok());
    assert_eq!(log.message().as_deref(), Some(error_message(SUCCESS)));

    release();
    release();
}
