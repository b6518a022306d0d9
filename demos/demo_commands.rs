use parlance::{
    Collection, Command, CommandLineParser, CommandManager, Dictionary, Nargs, Parameter, Scalar,
    Switch,
};

#[derive(Debug)]
enum Action {
    Add {
        force: bool,
        paths: Vec<String>,
    },
    Config {
        define: indexmap::IndexMap<String, String>,
    },
    Remove {
        path: String,
    },
}

fn main() {
    let add = CommandLineParser::new("vcs add")
        .about("Stage files.")
        .add(Parameter::option(Switch::new(), "force").short('f'))
        .add(
            Parameter::argument(Collection::<Vec<String>, String>::new(Nargs::AtLeastOne), "path")
                .required(),
        )
        .build(|arguments| {
            Ok(Action::Add {
                force: arguments.take::<bool>("force")?,
                paths: arguments.take::<Vec<String>>("path")?,
            })
        });
    let config = CommandLineParser::new("vcs config")
        .add(
            Parameter::option(Dictionary::<String, String>::new(), "define")
                .short('D')
                .meta("KEY=VALUE"),
        )
        .build(|arguments| {
            Ok(Action::Config {
                define: arguments.take("define")?,
            })
        });
    let remove = CommandLineParser::new("vcs remove")
        .add(Parameter::argument(Scalar::<String>::new(), "path").required())
        .build(|arguments| {
            Ok(Action::Remove {
                path: arguments.take::<String>("path")?,
            })
        });

    let parser = CommandManager::new("vcs")
        .about("A tiny version control front end.")
        .add(Command::new("add", add).help("Stage files."))
        .add(Command::new("config", config).alias("cfg"))
        .add(Command::new("remove", remove).alias("rm").help("Remove a file."))
        .build();

    println!("{:?}", parser.parse());
}
