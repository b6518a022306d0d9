use parlance::{Collection, CommandLineParser, Nargs, Parameter};

fn main() {
    let parser = CommandLineParser::new("summer")
        .add(
            Parameter::argument(Collection::<Vec<u32>, u32>::new(Nargs::AtLeastOne), "item")
                .required()
                .help("The items to sum."),
        )
        .build(|arguments| arguments.take::<Vec<u32>>("item"));
    let items = parser.parse();
    println!("Sum: {}", items.iter().sum::<u32>());
}
