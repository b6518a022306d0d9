use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use assert_matches::assert_matches;
use indexmap::IndexMap;
use parlance::{
    Collection, Command, CommandLineParser, CommandManager, Dictionary, DuplicateAction,
    DuplicateArguments, ErrorCategory, HelpPrecedence, Mode, Nargs, Optional, Parameter,
    ParseError, ParseOptions, ParseResult, ParseStatus, Parser, Scalar, Switch,
};
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};
use rstest::rstest;

#[derive(Debug, Clone, PartialEq)]
struct Settings {
    count: u32,
    ratio: f64,
    name: String,
    verbose: bool,
    limit: Option<i64>,
    tags: Vec<String>,
}

fn settings_parser() -> Parser<Settings> {
    CommandLineParser::new("settings")
        .add(Parameter::option(Scalar::<u32>::new().default(1), "count").short('c'))
        .add(Parameter::option(Scalar::<f64>::new().default(0.5), "ratio").short('r'))
        .add(Parameter::option(Scalar::<String>::new().default("anon".to_string()), "name"))
        .add(Parameter::option(Switch::new(), "verbose").short('v'))
        .add(Parameter::option(Optional::<i64>::new(), "limit"))
        .add(Parameter::option(
            Collection::<Vec<String>, String>::new(Nargs::Any),
            "tag",
        ))
        .build(|arguments| {
            Ok(Settings {
                count: arguments.take("count")?,
                ratio: arguments.take("ratio")?,
                name: arguments.take("name")?,
                verbose: arguments.take("verbose")?,
                limit: arguments.take("limit")?,
                tags: arguments.take("tag")?,
            })
        })
}

fn render(settings: &Settings) -> Vec<Vec<String>> {
    let mut groups = vec![
        vec!["--count".to_string(), settings.count.to_string()],
        vec![format!("-r={}", settings.ratio)],
        vec![format!("--name={}", settings.name)],
    ];

    if settings.verbose {
        groups.push(vec!["-v".to_string()]);
    }

    if let Some(limit) = settings.limit {
        groups.push(vec![format!("--limit={limit}")]);
    }

    if !settings.tags.is_empty() {
        let mut group = vec!["--tag".to_string()];
        group.extend(settings.tags.iter().cloned());
        groups.push(group);
    }

    groups
}

#[test]
fn round_trip() {
    // Setup
    let parser = settings_parser();
    let mut rng = thread_rng();

    for _ in 0..50 {
        let tag_count = rng.gen_range(0..4);
        let expected = Settings {
            count: rng.gen(),
            ratio: rng.gen_range(0..1000) as f64 / 8.0,
            name: format!("user{}", rng.gen_range(0..100)),
            verbose: rng.gen(),
            limit: if rng.gen() {
                Some(rng.gen_range(-1000..1000))
            } else {
                None
            },
            tags: (0..tag_count).map(|i| format!("tag{i}")).collect(),
        };
        let mut groups = render(&expected);
        groups.shuffle(&mut rng);
        let tokens: Vec<String> = groups.into_iter().flatten().collect();
        let tokens: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();

        // Execute
        let result = parser.parse_tokens(&tokens);

        // Verify
        assert_eq!(result.ok(), Some(expected.clone()), "tokens: {tokens:?}");
    }
}

#[test]
fn defaults_idempotent() {
    // Setup
    let mut rng = thread_rng();
    let mut parameters = vec![
        ("count", 1u32),
        ("size", 2u32),
        ("depth", 3u32),
        ("width", 4u32),
    ];
    parameters.shuffle(&mut rng);
    let mut builder = CommandLineParser::new("program");

    for (name, default) in parameters.iter() {
        builder = builder.add(Parameter::option(Scalar::<u32>::new().default(*default), *name));
    }

    let parser = builder.build(|arguments| {
        Ok((
            arguments.take::<u32>("count")?,
            arguments.take::<u32>("size")?,
            arguments.take::<u32>("depth")?,
            arguments.take::<u32>("width")?,
        ))
    });

    // Execute
    let first = parser.parse_tokens(empty::slice());
    let second = parser.parse_tokens(empty::slice());

    // Verify
    assert_eq!(first.ok(), Some((1, 2, 3, 4)));
    assert_eq!(second.ok(), Some((1, 2, 3, 4)));
}

#[test]
fn required_missing() {
    // Setup
    let parser = CommandLineParser::new("program")
        .add(Parameter::option(Scalar::<u32>::new(), "count").required())
        .add(Parameter::option(Switch::new(), "verbose"))
        .build(|arguments| arguments.take::<u32>("count"));

    // Execute
    let result = parser.parse_tokens(&["--verbose"]);

    // Verify
    assert_matches!(result, ParseResult::Error(error) => {
        assert_eq!(error.category(), ErrorCategory::MissingRequiredArgument);
        assert_eq!(error.argument_name(), Some("count"));
        assert_eq!(error.to_string(), "Parse error: missing required argument 'count'.");
    });
}

#[test]
fn positional_order_rejected() {
    let error = CommandLineParser::new("program")
        .add(Parameter::argument(Scalar::<u32>::new(), "optional"))
        .add(Parameter::argument(Scalar::<u32>::new(), "required").required())
        .build_parser(|_| Ok(()))
        .err()
        .unwrap();
    assert_eq!(
        error.to_string(),
        "Config error: required positional argument 'required' cannot follow optional positional argument 'optional'."
    );
}

#[test]
fn positionals_by_name_and_position() {
    // Setup
    let parser = CommandLineParser::new("copy")
        .add(Parameter::argument(Scalar::<String>::new(), "source").required())
        .add(Parameter::argument(Scalar::<String>::new(), "target").required())
        .build(|arguments| {
            Ok((
                arguments.take::<String>("source")?,
                arguments.take::<String>("target")?,
            ))
        });
    let expected = Some(("a".to_string(), "b".to_string()));

    // Execute & verify
    assert_eq!(parser.parse_tokens(&["a", "b"]).ok(), expected);
    assert_eq!(parser.parse_tokens(&["--target", "b", "a"]).ok(), expected);
    assert_eq!(parser.parse_tokens(&["--", "a", "b"]).ok(), expected);
    assert_matches!(
        parser.parse_tokens(&["a", "b", "c"]).error(),
        Some(ParseError::TooManyPositionalArguments { index: 2, .. })
    );
}

#[test]
fn multi_value_order() {
    // Setup
    let parser = CommandLineParser::new("program")
        .add(Parameter::option(
            Collection::<Vec<u32>, u32>::new(Nargs::Any),
            "id",
        ))
        .add(Parameter::option(Switch::new(), "verbose"))
        .build(|arguments| arguments.take::<Vec<u32>>("id"));

    // Execute
    let result = parser.parse_tokens(&["--id", "3", "1", "--verbose", "--id", "2"]);

    // Verify
    assert_eq!(result.ok(), Some(vec![3, 1, 2]));
}

#[test]
fn dictionary_entries() {
    // Setup
    let parser = CommandLineParser::new("program")
        .add(Parameter::option(Dictionary::<String, u32>::new(), "define").short('D'))
        .build(|arguments| arguments.take::<IndexMap<String, u32>>("define"));

    // Execute
    let result = parser.parse_tokens(&["-D", "b=2", "--define", "a=1"]);

    // Verify
    let expected: IndexMap<String, u32> =
        IndexMap::from([("b".to_string(), 2), ("a".to_string(), 1)]);
    assert_eq!(result.ok(), Some(expected));
}

#[rstest]
#[case(vec!["--foo", "1"], Some((Some(1), None)))]
#[case(vec!["--foob", "1"], Some((None, Some(1))))]
#[case(vec!["--foobar", "1"], Some((None, Some(1))))]
#[case(vec!["--fo", "1"], None)]
fn prefix_matching(#[case] tokens: Vec<&str>, #[case] expected: Option<(Option<u32>, Option<u32>)>) {
    // Setup
    let parser = CommandLineParser::new("program")
        .add(Parameter::option(Optional::<u32>::new(), "foo"))
        .add(Parameter::option(Optional::<u32>::new(), "foobar"))
        .build(|arguments| {
            Ok((
                arguments.take::<Option<u32>>("foo")?,
                arguments.take::<Option<u32>>("foobar")?,
            ))
        });

    // Execute
    let result = parser.parse_tokens(&tokens);

    // Verify
    match expected {
        Some(expected) => assert_eq!(result.ok(), Some(expected)),
        None => {
            assert_matches!(result.error(), Some(ParseError::AmbiguousName { candidates, index: 0, .. }) => {
                assert_eq!(candidates, &vec!["foo".to_string(), "foobar".to_string()]);
            });
        }
    }
}

fn duplicate_parser(policy: DuplicateArguments, calls: Arc<AtomicUsize>) -> Parser<u32> {
    CommandLineParser::new("program")
        .options(ParseOptions::default().duplicate_arguments(policy))
        .on_duplicate(move |duplicate| {
            assert_eq!(duplicate.name, "count");
            assert_eq!(duplicate.old_value.as_deref(), Some("1"));
            assert_eq!(duplicate.new_value.as_deref(), Some("2"));
            calls.fetch_add(1, Ordering::SeqCst);
            DuplicateAction::KeepNew
        })
        .add(Parameter::option(Scalar::<u32>::new(), "count"))
        .build(|arguments| arguments.take::<u32>("count"))
}

#[rstest]
#[case(DuplicateArguments::Error, None, 0)]
#[case(DuplicateArguments::Warning, Some(2), 1)]
#[case(DuplicateArguments::Allow, Some(2), 0)]
fn duplicate_policies(
    #[case] policy: DuplicateArguments,
    #[case] expected: Option<u32>,
    #[case] expected_calls: usize,
) {
    // Setup
    let calls = Arc::new(AtomicUsize::new(0));
    let parser = duplicate_parser(policy, calls.clone());

    // Execute
    let result = parser.parse_tokens(&["--count", "1", "--count", "2"]);

    // Verify
    match expected {
        Some(value) => assert_eq!(result.ok(), Some(value)),
        None => assert_matches!(
            result.error(),
            Some(ParseError::DuplicateArgument { index: 2, .. })
        ),
    }
    assert_eq!(calls.load(Ordering::SeqCst), expected_calls);
}

#[rstest]
#[case(HelpPrecedence::Always, vec!["--count", "x", "--help"], ParseStatus::HelpRequested)]
#[case(HelpPrecedence::FirstError, vec!["--count", "x", "--help"], ParseStatus::Error)]
#[case(HelpPrecedence::Always, vec!["--help", "--count", "x"], ParseStatus::HelpRequested)]
#[case(HelpPrecedence::FirstError, vec!["--help", "--count", "x"], ParseStatus::HelpRequested)]
#[case(HelpPrecedence::Always, vec!["-?"], ParseStatus::HelpRequested)]
#[case(HelpPrecedence::FirstError, vec!["--count", "1"], ParseStatus::Success)]
fn help_precedence(
    #[case] precedence: HelpPrecedence,
    #[case] tokens: Vec<&str>,
    #[case] expected: ParseStatus,
) {
    // Setup
    let parser = CommandLineParser::new("program")
        .options(ParseOptions::default().help_precedence(precedence))
        .add(Parameter::option(Scalar::<u32>::new(), "count"))
        .build(|arguments| arguments.take::<u32>("count"));

    // Execute
    let result = parser.parse_tokens(&tokens);

    // Verify
    assert_eq!(result.status(), expected);
}

#[test]
fn help_usage() {
    let parser = CommandLineParser::new("program")
        .about("Does things.")
        .add(Parameter::option(Scalar::<u32>::new(), "count").help("How many."))
        .build(|_| Ok(()));
    assert_matches!(parser.parse_tokens(&["-h"]), ParseResult::HelpRequested { argument, usage } => {
        assert_eq!(argument, "help");
        assert_eq!(usage.program, "program");
        assert_eq!(usage.about.as_deref(), Some("Does things."));
        assert_eq!(usage.arguments.len(), 2);
    });
}

#[rstest]
#[case(vec!["-count:5", "/verbose"])]
#[case(vec!["/COUNT=5", "-v"])]
#[case(vec!["-c", "5", "/v"])]
fn legacy_syntax(#[case] tokens: Vec<&str>) {
    // Setup
    let parser = CommandLineParser::new("program")
        .options(ParseOptions::default().mode(Mode::Legacy).prefixes(["-", "/"]))
        .add(Parameter::option(Scalar::<u32>::new(), "count").short('c'))
        .add(Parameter::option(Switch::new(), "verbose").short('v'))
        .build(|arguments| Ok((arguments.take::<u32>("count")?, arguments.take::<bool>("verbose")?)));

    // Execute
    let result = parser.parse_tokens(&tokens);

    // Verify
    assert_eq!(result.ok(), Some((5, true)));
}

#[test]
fn concurrent_reuse() {
    // Setup
    let parser = settings_parser();

    // Execute
    let results: Vec<Option<Settings>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8u32)
            .map(|i| {
                let parser = &parser;
                scope.spawn(move || {
                    let count = i.to_string();
                    parser.parse_tokens(&["--count", &count, "-v"]).ok()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    // Verify
    for (i, result) in results.into_iter().enumerate() {
        let settings = result.unwrap();
        assert_eq!(settings.count, i as u32);
        assert!(settings.verbose);
        assert_eq!(settings.name, "anon");
    }
}

#[derive(Debug, PartialEq)]
enum Action {
    Add { force: bool, paths: Vec<String> },
    Remove { path: String },
}

fn vcs() -> parlance::CommandParser<Action> {
    let add = CommandLineParser::new("vcs add")
        .add(Parameter::option(Switch::new(), "force").short('f'))
        .add(
            Parameter::argument(
                Collection::<Vec<String>, String>::new(Nargs::AtLeastOne),
                "path",
            )
            .required(),
        )
        .build(|arguments| {
            Ok(Action::Add {
                force: arguments.take("force")?,
                paths: arguments.take("path")?,
            })
        });
    let remove = CommandLineParser::new("vcs remove")
        .add(Parameter::argument(Scalar::<String>::new(), "path").required())
        .build(|arguments| {
            Ok(Action::Remove {
                path: arguments.take("path")?,
            })
        });

    CommandManager::new("vcs")
        .add(Command::new("add", add))
        .add(Command::new("remove", remove).alias("rm"))
        .build()
}

#[test]
fn commands() {
    // Setup
    let parser = vcs();

    // Execute
    let add = parser.parse_tokens(&["add", "-f", "a.txt", "b.txt"]);
    let remove = parser.parse_tokens(&["rm", "a.txt"]);
    let unknown = parser.parse_tokens(&["commit"]);
    let missing = parser.parse_tokens(empty::slice());
    let nested_error = parser.parse_tokens(&["remove", "a.txt", "b.txt"]);

    // Verify
    assert_eq!(
        add.ok(),
        Some(Action::Add {
            force: true,
            paths: vec!["a.txt".to_string(), "b.txt".to_string()],
        })
    );
    assert_eq!(
        remove.ok(),
        Some(Action::Remove {
            path: "a.txt".to_string()
        })
    );
    assert_matches!(unknown.error(), Some(ParseError::UnknownCommand { index: 0, .. }));
    assert_matches!(missing.error(), Some(ParseError::MissingCommand));
    assert_matches!(
        nested_error.error(),
        Some(ParseError::TooManyPositionalArguments { index: 2, .. })
    );
}

#[test]
fn command_help() {
    let parser = vcs();
    assert_matches!(parser.parse_tokens(&["add", "--help"]), ParseResult::HelpRequested { usage, .. } => {
        assert_eq!(usage.program, "vcs add");
    });
    assert_matches!(parser.parse_tokens(&["-h"]), ParseResult::HelpRequested { usage, .. } => {
        assert_eq!(usage.program, "vcs");
        assert_eq!(usage.commands.len(), 2);
    });
}
