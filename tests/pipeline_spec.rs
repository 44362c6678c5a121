mod common;

use launch_predictor::config::Config;
use launch_predictor::launch_core::features::{payload_count, training_set};
use launch_predictor::launch_core::forest::ForestConfig;
use launch_predictor::launch_core::query::{aggregate, filter, filter_and_aggregate, list_years};
use launch_predictor::launch_core::report::{train_test_split, TableSummary};
use launch_predictor::launch_core::sites::SiteDirectory;
use launch_predictor::launch_core::{
    table, CoreError, FilterQuery, OutcomeLabel, OutcomeModel, SiteSelector,
};
use launch_predictor::state::AppState;
use speculate2::speculate;

use common::*;

speculate! {
    before {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("launches.csv");
        table::write_table(&path, &launches()).expect("Failed to write table");
        let mut config = Config::with_data_path(&path);
        config.seed = Some(42);
    }

    describe "startup" {
        it "loads the table and fits a model" {
            let state = AppState::load(&config).expect("Failed to load state");

            assert_eq!(state.records().len(), 10);
            assert_eq!(state.model().unwrap().stats().samples, 9);
            assert_eq!(state.predict(1).unwrap().label, OutcomeLabel::Success);
        }

        it "refuses to start on a table with a missing column" {
            std::fs::write(&path, "name,date_utc,success\nA,2020-01-01T00:00:00Z,true\n").unwrap();

            let err = AppState::load(&config).err().expect("load should fail");
            let core = err.downcast_ref::<CoreError>().expect("core error expected");
            assert!(matches!(core, CoreError::MissingColumn(_)));
        }

        it "refuses to start when no outcome is known" {
            let unknown: Vec<_> = launches()
                .into_iter()
                .map(|mut r| { r.outcome = None; r })
                .collect();
            table::write_table(&path, &unknown).unwrap();

            assert!(AppState::load(&config).is_err());
        }

        it "refuses to start on a missing table" {
            config.data_path = dir.path().join("absent.csv");
            assert!(AppState::load(&config).is_err());
        }
    }

    describe "feature derivation" {
        it "counts comma-delimited payloads" {
            let records = table::read_table(&path).unwrap();
            let counts: Vec<u32> = records.iter().map(|r| r.payload_count()).collect();
            assert_eq!(counts, vec![1, 1, 3, 2, 1, 3, 1, 3, 1, 1]);
        }

        it "treats a placeholder descriptor as one payload" {
            assert_eq!(payload_count("None"), 1);
        }

        it "builds one training pair per known outcome" {
            let records = table::read_table(&path).unwrap();
            let known = records.iter().filter(|r| r.outcome.is_some()).count();
            assert_eq!(training_set(&records).len(), known);
        }
    }

    describe "outcome model" {
        it "reproduces the trivially separable scenario" {
            let records = vec![
                launch("s", 2020, SLC40, Some(true), "sat1"),
                launch("f", 2020, SLC40, Some(false), "sat1,sat2"),
            ];
            let examples = training_set(&records);
            assert_eq!(examples.iter().map(|e| e.payload_count).collect::<Vec<_>>(), vec![1, 2]);

            let model = OutcomeModel::fit(&examples, ForestConfig::with_seed(42)).unwrap();
            assert_eq!(model.predict(1).label, OutcomeLabel::Success);
        }

        it "is reproducible for a fixed seed" {
            let examples = training_set(&launches());
            let a = OutcomeModel::fit(&examples, ForestConfig::with_seed(11)).unwrap();
            let b = OutcomeModel::fit(&examples, ForestConfig::with_seed(11)).unwrap();
            for count in 1..=10 {
                assert_eq!(a.predict(count), b.predict(count));
            }
        }

        it "fails on an empty training set" {
            let err = OutcomeModel::fit(&[], ForestConfig::with_seed(1)).unwrap_err();
            assert!(matches!(err, CoreError::InvalidInput(_)));
        }

        it "trains on a seeded split" {
            let examples = training_set(&launches());
            let (train, test) = train_test_split(&examples, 0.2, 42).unwrap();
            assert_eq!(test.len(), 2);
            assert_eq!(train.len(), 7);
        }
    }

    describe "filtering" {
        it "returns only launches from the selected year" {
            let records = table::read_table(&path).unwrap();
            let result = filter_and_aggregate(&records, &FilterQuery::new(2020, SiteSelector::All));

            assert!(result.records.iter().all(|r| r.year() == 2020));
            assert_eq!((result.success_count, result.failure_count), (2, 1));
        }

        it "keeps unknown outcomes in the records but not in the counts" {
            let records = table::read_table(&path).unwrap();
            let query = FilterQuery::new(2020, SiteSelector::Site(SLC40.to_string()));
            let matching = filter(&records, &query);
            let counts = aggregate(matching.iter().copied());

            assert_eq!(matching.len(), 3);
            assert_eq!(counts.known(), 2);
            assert_eq!(counts.unknown, 1);
        }

        it "narrows the all-sites result when a site is chosen" {
            let records = table::read_table(&path).unwrap();
            let all = filter(&records, &FilterQuery::new(2021, SiteSelector::All));
            let site = filter(&records, &FilterQuery::new(2021, SiteSelector::parse(Some(LC39A))));

            assert_eq!(site.len(), 1);
            assert!(site.iter().all(|s| all.iter().any(|a| a.id == s.id)));
        }

        it "lists years ascending" {
            let records = table::read_table(&path).unwrap();
            assert_eq!(list_years(&records), vec![2019, 2020, 2021]);
        }
    }

    describe "map markers" {
        it "skips launches at pads without coordinates" {
            let records = table::read_table(&path).unwrap();
            let markers = SiteDirectory::builtin().markers(&records);

            assert_eq!(markers.len(), 9);
            assert!(markers.iter().all(|m| m.launchpad != UNMAPPED_PAD));
        }
    }

    describe "table summary" {
        it "reports shape and outcome balance" {
            let summary = TableSummary::from_file(&path).unwrap();
            let outcomes = summary.outcomes.unwrap();

            assert_eq!(summary.rows, 10);
            assert_eq!(summary.columns.len(), 7);
            assert_eq!((outcomes.success, outcomes.failure, outcomes.unknown), (6, 3, 1));
        }
    }
}
