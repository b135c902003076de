#[cfg(test)]
mod tests {
    use crate::Stoichiometry::equation_balancer::{
        BalanceRequest, BalancerSettings, BalancedEquation, Coefficient, balance,
        balance_vector_of_equations,
    };
    use serde_json::json;

    fn integer_coefficients(balanced: &BalancedEquation) -> (Vec<i64>, Vec<i64>) {
        let side = |terms: &[crate::Stoichiometry::equation_balancer::BalancedTerm]| {
            terms
                .iter()
                .map(|term| match term.coefficient {
                    Coefficient::Integer(n) => n,
                    Coefficient::Fraction { .. } => panic!("expected integer coefficients"),
                })
                .collect()
        };
        (side(&balanced.left), side(&balanced.right))
    }

    #[test]
    fn test_water_formation() {
        let balanced = balance("H2 + O2 = H2O", BalancerSettings::new()).unwrap();
        assert_eq!(integer_coefficients(&balanced), (vec![2, 1], vec![2]));
        assert_eq!(balanced.to_equation_string(), "2H2 + O2 = 2H2O");
    }

    #[test]
    fn test_ethane_combustion() {
        let balanced = balance("C2H6 + O2 = CO2 + H2O", BalancerSettings::new()).unwrap();
        assert_eq!(integer_coefficients(&balanced), (vec![2, 7], vec![4, 6]));
        assert_eq!(
            balanced.to_equation_string(),
            "2C2H6 + 7O2 = 4CO2 + 6H2O"
        );
    }

    #[test]
    fn test_iron_oxide_formation() {
        let balanced = balance("Fe + O2 = Fe2O3", BalancerSettings::new()).unwrap();
        assert_eq!(integer_coefficients(&balanced), (vec![4, 3], vec![2]));
    }

    #[test]
    fn test_same_compound_on_both_sides() {
        let balanced = balance("H2 = H2", BalancerSettings::new()).unwrap();
        assert_eq!(integer_coefficients(&balanced), (vec![1], vec![1]));
        assert_eq!(balanced.to_equation_string(), "H2 = H2");
    }

    #[test]
    fn test_disjoint_elements_cannot_balance() {
        let err = balance("H = O", BalancerSettings::new()).unwrap_err();
        assert_eq!(err.kind(), "UnbalanceableError");
    }

    #[test]
    fn test_empty_term_is_malformed() {
        let err = balance("H2 + = H2O", BalancerSettings::new()).unwrap_err();
        assert_eq!(err.kind(), "MalformedEquationError");
        assert!(err.to_string().contains("empty compound term"));
    }

    #[test]
    fn test_arrow_separators() {
        let plain = balance("H2 + O2 = H2O", BalancerSettings::new()).unwrap();
        let arrow = balance("H2 + O2 -> H2O", BalancerSettings::new()).unwrap();
        let fat_arrow = balance("H2 + O2 => H2O", BalancerSettings::new()).unwrap();
        assert_eq!(plain, arrow);
        assert_eq!(plain, fat_arrow);
        // the rendering always uses `=`
        assert_eq!(arrow.to_equation_string(), "2H2 + O2 = 2H2O");
    }

    #[test]
    fn test_multiple_separators_rejected() {
        let err = balance("H2 = O2 = H2O", BalancerSettings::new()).unwrap_err();
        assert_eq!(err.kind(), "MalformedEquationError");
        assert!(err.to_string().contains("separator"));
    }

    #[test]
    fn test_leading_coefficient_rejected() {
        let err = balance("2H2 + O2 = H2O", BalancerSettings::new()).unwrap_err();
        assert_eq!(err.kind(), "MalformedEquationError");
        assert!(err.to_string().contains("coefficient"));
    }

    #[test]
    fn test_whitespace_is_optional() {
        let balanced = balance("H2+O2=H2O", BalancerSettings::new()).unwrap();
        assert_eq!(balanced.to_equation_string(), "2H2 + O2 = 2H2O");
    }

    #[test]
    fn test_nested_groups() {
        let balanced = balance(
            "Fe2(SO4)3 + KOH = Fe(OH)3 + K2SO4",
            BalancerSettings::new(),
        )
        .unwrap();
        assert_eq!(integer_coefficients(&balanced), (vec![1, 6], vec![2, 3]));
        assert_eq!(
            balanced.to_equation_string(),
            "Fe2(SO4)3 + 6KOH = 2Fe(OH)3 + 3K2SO4"
        );
    }

    #[test]
    fn test_permanganate_chloride_redox() {
        let balanced = balance(
            "KMnO4 + HCl = KCl + MnCl2 + H2O + Cl2",
            BalancerSettings::new(),
        )
        .unwrap();
        assert_eq!(
            integer_coefficients(&balanced),
            (vec![2, 16], vec![2, 2, 8, 5])
        );
    }

    #[test]
    fn test_copper_in_nitric_acid() {
        let balanced = balance(
            "Cu + HNO3 = Cu(NO3)2 + NO + H2O",
            BalancerSettings::new(),
        )
        .unwrap();
        assert_eq!(
            integer_coefficients(&balanced),
            (vec![3, 8], vec![3, 2, 4])
        );
    }

    #[test]
    fn test_states_survive_to_output() {
        let balanced = balance("CaCO3(s) = CaO(s) + CO2(g)", BalancerSettings::new()).unwrap();
        assert_eq!(
            balanced.to_equation_string(),
            "CaCO3(s) = CaO(s) + CO2(g)"
        );
    }

    #[test]
    fn test_states_distinguish_compounds() {
        // evaporation: the two states are different columns, both coefficient 1
        let balanced = balance("H2O(l) = H2O(g)", BalancerSettings::new()).unwrap();
        assert_eq!(integer_coefficients(&balanced), (vec![1], vec![1]));
        assert_eq!(balanced.to_equation_string(), "H2O(l) = H2O(g)");
    }

    #[test]
    fn test_duplicate_mentions_collapse() {
        let balanced = balance("H2 + H2 + O2 = H2O", BalancerSettings::new()).unwrap();
        assert_eq!(integer_coefficients(&balanced), (vec![2, 1], vec![2]));
        assert_eq!(balanced.to_equation_string(), "2H2 + O2 = 2H2O");
    }

    #[test]
    fn test_ambiguous_superposition() {
        let err = balance("C + O2 = CO + CO2", BalancerSettings::new()).unwrap_err();
        assert_eq!(err.kind(), "AmbiguousEquationError");
    }

    #[test]
    fn test_spectator_forces_zero_coefficient() {
        // O2 cancels across the sides, leaving H2 = H2O which cannot balance
        let err = balance("H2 + O2 = H2O + O2", BalancerSettings::new()).unwrap_err();
        assert_eq!(err.kind(), "UnbalanceableError");
        assert!(err.to_string().contains("not a positive value"));
    }

    #[test]
    fn test_negative_direction_cannot_balance() {
        let err = balance("H2 = H2O + O2", BalancerSettings::new()).unwrap_err();
        assert_eq!(err.kind(), "UnbalanceableError");
    }

    #[test]
    fn test_ionic_precipitation() {
        let balanced = balance("Ag^+ + Cl^- = AgCl", BalancerSettings::ionic()).unwrap();
        assert_eq!(integer_coefficients(&balanced), (vec![1, 1], vec![1]));
        assert_eq!(balanced.to_equation_string(), "Ag^+ + Cl^- = AgCl");
    }

    #[test]
    fn test_ionic_neutralization_with_bare_signs() {
        let balanced = balance("H^+ + OH- = H2O", BalancerSettings::ionic()).unwrap();
        assert_eq!(integer_coefficients(&balanced), (vec![1, 1], vec![1]));
    }

    #[test]
    fn test_permanganate_iron_redox_with_charges() {
        let balanced = balance(
            "MnO4^- + Fe^2+ + H^+ = Mn^2+ + Fe^3+ + H2O",
            BalancerSettings::ionic(),
        )
        .unwrap();
        assert_eq!(
            integer_coefficients(&balanced),
            (vec![1, 5, 8], vec![1, 5, 4])
        );
    }

    #[test]
    fn test_charge_row_blocks_electron_leak() {
        // element conservation alone would accept this, charge does not
        let err = balance("Fe^2+ = Fe^3+", BalancerSettings::ionic()).unwrap_err();
        assert_eq!(err.kind(), "UnbalanceableError");
    }

    #[test]
    fn test_charge_marker_needs_charge_mode() {
        let err = balance("Cl^- = Cl^-", BalancerSettings::new()).unwrap_err();
        assert_eq!(err.kind(), "MalformedEquationError");
        assert!(err.to_string().contains("charge-balance mode is disabled"));
    }

    #[test]
    fn test_fractional_water() {
        let balanced = balance("H2 + O2 = H2O", BalancerSettings::fractional()).unwrap();
        assert_eq!(
            balanced.left[0].coefficient,
            Coefficient::Integer(1)
        );
        assert_eq!(
            balanced.left[1].coefficient,
            Coefficient::Fraction {
                numerator: 1,
                denominator: 2
            }
        );
        assert_eq!(balanced.right[0].coefficient, Coefficient::Integer(1));
        assert_eq!(balanced.to_equation_string(), "H2 + 1/2O2 = H2O");
    }

    #[test]
    fn test_fractional_ethane_combustion() {
        let balanced = balance(
            "C2H6 + O2 = CO2 + H2O",
            BalancerSettings::fractional(),
        )
        .unwrap();
        assert_eq!(
            balanced.to_equation_string(),
            "C2H6 + 7/2O2 = 2CO2 + 3H2O"
        );
    }

    #[test]
    fn test_balancing_minimal_equation_is_stable() {
        let first = balance("NaCl + AgNO3 = AgCl + NaNO3", BalancerSettings::new()).unwrap();
        assert_eq!(
            first.to_equation_string(),
            "NaCl + AgNO3 = AgCl + NaNO3"
        );
        let second = balance(&first.to_equation_string(), BalancerSettings::new()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_success_serialization_shape() {
        let balanced = balance("H2 + O2 = H2O(g)", BalancerSettings::new()).unwrap();
        let value = serde_json::to_value(&balanced).unwrap();
        assert_eq!(
            value,
            json!({
                "left": [
                    {"formula": "H2", "coefficient": 2},
                    {"formula": "O2", "coefficient": 1}
                ],
                "right": [
                    {"formula": "H2O", "state": "(g)", "coefficient": 2}
                ]
            })
        );
    }

    #[test]
    fn test_fractional_serialization_shape() {
        let balanced = balance("H2 + O2 = H2O", BalancerSettings::fractional()).unwrap();
        let value = serde_json::to_value(&balanced).unwrap();
        assert_eq!(
            value["left"][1],
            json!({"formula": "O2", "coefficient": {"numerator": 1, "denominator": 2}})
        );
        assert_eq!(value["left"][0]["coefficient"], json!(1));
    }

    #[test]
    fn test_request_deserialization_defaults() {
        let request: BalanceRequest =
            serde_json::from_str(r#"{"equation": "Fe + O2 = Fe2O3"}"#).unwrap();
        assert!(!request.fractional);
        assert!(!request.charge_balance);
        let balanced = request.run().unwrap();
        assert_eq!(balanced.to_equation_string(), "4Fe + 3O2 = 2Fe2O3");
    }

    #[test]
    fn test_request_with_flags() {
        let request: BalanceRequest = serde_json::from_str(
            r#"{"equation": "Ag^+ + Cl^- = AgCl", "charge_balance": true}"#,
        )
        .unwrap();
        let balanced = request.run().unwrap();
        assert_eq!(balanced.to_equation_string(), "Ag^+ + Cl^- = AgCl");

        let request: BalanceRequest = serde_json::from_str(
            r#"{"equation": "H2 + O2 = H2O", "fractional": true}"#,
        )
        .unwrap();
        let balanced = request.run().unwrap();
        assert_eq!(balanced.to_equation_string(), "H2 + 1/2O2 = H2O");
    }

    #[test]
    fn test_error_report_shape() {
        let err = balance("C + O2 = CO + CO2", BalancerSettings::new()).unwrap_err();
        let value = serde_json::to_value(err.report()).unwrap();
        assert_eq!(value["errorKind"], json!("AmbiguousEquationError"));
        assert!(
            value["message"]
                .as_str()
                .unwrap()
                .contains("multiple independent balances")
        );
    }

    #[test]
    fn test_vector_of_equations() {
        let results = balance_vector_of_equations(
            vec!["H2 + O2 = H2O", "H = O", "Fe + O2 = Fe2O3"],
            BalancerSettings::new(),
        );
        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0].as_ref().unwrap().to_equation_string(),
            "2H2 + O2 = 2H2O"
        );
        assert_eq!(results[1].as_ref().unwrap_err().kind(), "UnbalanceableError");
        assert_eq!(
            results[2].as_ref().unwrap().to_equation_string(),
            "4Fe + 3O2 = 2Fe2O3"
        );
    }
}
