//! Integration tests for reading study inputs from disk.

use approx::assert_abs_diff_eq;
use macbeth_data::{DataError, NationalAccounts, NipaColumns, read_asset_returns};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_read_asset_returns_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "test_assets.csv",
        "year,SMALL LoBM,BIG HiBM\n1990,12.5,NaN\n1991,-3.0,7.25\n1992,,4.0\n",
    );

    let table = read_asset_returns(&path).unwrap();
    assert_eq!(table.n_assets(), 2);
    assert_eq!(table.n_periods(), 3);
    assert_eq!(table.column("SMALL LoBM").unwrap(), &[Some(12.5), Some(-3.0), None]);
    assert_eq!(table.column("BIG HiBM").unwrap(), &[None, Some(7.25), Some(4.0)]);
}

#[test]
fn test_read_asset_returns_bad_cell() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "bad.csv", "year,A\n1990,x1\n");
    let err = read_asset_returns(&path).unwrap_err();
    assert!(matches!(err, DataError::Parse { row: 1, ref column, .. } if column == "A"));
}

#[test]
fn test_national_accounts_from_csv() {
    let dir = TempDir::new().unwrap();
    let consumption = write(
        dir.path(),
        "consumption.csv",
        "year,nondurables,services\n2000,100,100\n2001,110,110\n2002,121,121\n",
    );
    let population = write(dir.path(), "pop.csv", "year,pop\n2000,2000\n2001,2000\n2002,2000\n");
    let prices = write(
        dir.path(),
        "prices.csv",
        "prc_index_nondurables,prc_index_services\n1,1\n1,1\n1,1\n",
    );

    let accounts =
        NationalAccounts::from_csv(&consumption, &population, &prices, &NipaColumns::default())
            .unwrap();
    assert_eq!(accounts.years(), &[2000, 2001, 2002]);

    let factors = accounts.factors(0.46).unwrap();
    assert_abs_diff_eq!(factors.per_capita[0], 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(factors.filtered.get(2).unwrap(), 1.1f64.ln(), epsilon = 1e-12);
    assert_eq!(factors.unfiltered.missing_count(), 3);
}

#[test]
fn test_national_accounts_year_mismatch() {
    let dir = TempDir::new().unwrap();
    let consumption = write(
        dir.path(),
        "consumption.csv",
        "year,nondurables,services\n2000,1,1\n2001,1,1\n",
    );
    let population = write(dir.path(), "pop.csv", "year,pop\n2000,1\n2002,1\n");
    let prices = write(
        dir.path(),
        "prices.csv",
        "prc_index_nondurables,prc_index_services\n1,1\n1,1\n",
    );

    let err =
        NationalAccounts::from_csv(&consumption, &population, &prices, &NipaColumns::default())
            .unwrap_err();
    assert!(matches!(
        err,
        DataError::YearMismatch {
            row: 1,
            left: 2001,
            right: 2002
        }
    ));
}
