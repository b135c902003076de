#[allow(non_snake_case)]
pub mod Stoichiometry;
#[allow(non_snake_case)]
pub mod Utils;

use Stoichiometry::equation_balancer::{BalancerSettings, balance};
use Utils::logging::init_console_logging;
use log::LevelFilter;

pub fn main() {
    init_console_logging(LevelFilter::Info);
    let equations = vec![
        "C2H6 + O2 = CO2 + H2O",
        "Fe + O2 = Fe2O3",
        "KMnO4 + HCl = KCl + MnCl2 + H2O + Cl2",
    ];
    for equation in equations {
        match balance(equation, BalancerSettings::new()) {
            Ok(balanced) => balanced.pretty_print_balanced(),
            Err(e) => println!("{}", e),
        }
    }
}
