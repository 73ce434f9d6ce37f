use flate2::Compression;
use flate2::write::GzEncoder;
use noodles::vcf::variant::io::Write as _;
use noodles::{bcf, vcf};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

pub const SAMPLES: [&str; 6] = ["S1", "S2", "S3", "S4", "S5", "S6"];

// (chrom, 1-based pos, ref, alt, one GT per sample)
const RECORDS: &[(&str, u64, &str, &str, [&str; 6])] = &[
    ("1", 100, "A", "G", ["0/0", "0/1", "1/1", "./.", "0|1", "1|0"]),
    ("1", 200, "C", "CT", ["0/0", "0/0", "0/0", "0/0", "0/1", "."]),
    // triploid call makes the whole record non-diploid
    ("1", 300, "G", "A", ["0/0/1", "0/1", "1/1", "0/0", "0/0", "0/0"]),
    // un-split multi-allelic site
    ("1", 400, "T", "C,G", ["0/2", "1/1", "2/2", "0/0", "0/1", "1/0"]),
    ("X", 500, "A", "T", ["0", "1", "0", "1", ".", "0"]),
    ("1", 600, "AC", "GT", ["./.", "./.", "./.", "./.", "./.", "./."]),
    ("1", 700, "A", "<DEL>", ["0/0", "0/1", "1", "0|1", "1/1", "0/0"]),
];

pub const HEADER_LINE: &str = "pos\tref\talt\ttype\taa\tab\tbb\tnmiss\n";

pub const EXPECTED_ALL: &str = "pos\tref\talt\ttype\taa\tab\tbb\tnmiss\n\
    100\tA\tG\t1\t1\t3\t1\t1\n\
    200\tC\tCT\t4\t4\t1\t0\t1\n\
    400\tT\tC\t1\t1\t2\t1\t2\n\
    600\tAC\tGT\t2\t0\t0\t0\t6\n\
    700\tA\t<DEL>\t8\t2\t2\t1\t1\n";

/// Expected output when only S1 and S4 are kept.
pub const EXPECTED_S1_S4: &str = "pos\tref\talt\ttype\taa\tab\tbb\tnmiss\n\
    100\tA\tG\t1\t1\t0\t0\t1\n\
    200\tC\tCT\t4\t2\t0\t0\t0\n\
    400\tT\tC\t1\t1\t0\t0\t1\n\
    600\tAC\tGT\t2\t0\t0\t0\t2\n\
    700\tA\t<DEL>\t8\t1\t1\t0\t0\n";

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

#[derive(Clone, Copy)]
pub enum Encoding {
    Vcf,
    VcfGz,
    Bcf,
}

pub struct Dataset {
    pub dir: PathBuf,
    pub vcf: PathBuf,
}

fn scratch_dir(label: &str) -> io::Result<PathBuf> {
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join("hwecounts-tests").join(format!(
        "{}-{}-{}",
        std::process::id(),
        id,
        label
    ));
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn create_dataset(encoding: Encoding, label: &str) -> io::Result<Dataset> {
    let dir = scratch_dir(label)?;
    let text = vcf_text();
    let vcf = match encoding {
        Encoding::Vcf => {
            let path = dir.join("cohort.vcf");
            fs::write(&path, text)?;
            path
        }
        Encoding::VcfGz => {
            let path = dir.join("cohort.vcf.gz");
            write_gzip(&path, text.as_bytes())?;
            path
        }
        Encoding::Bcf => {
            let path = dir.join("cohort.bcf");
            write_bcf(&path, &text)?;
            path
        }
    };
    Ok(Dataset { dir, vcf })
}

/// A VCF with a header but no records.
pub fn create_header_only(label: &str) -> io::Result<Dataset> {
    let dir = scratch_dir(label)?;
    let vcf = dir.join("empty.vcf");
    fs::write(&vcf, header_text())?;
    Ok(Dataset { dir, vcf })
}

pub fn vcf_text() -> String {
    let mut text = header_text();
    for (chrom, pos, reference, alt, gts) in RECORDS {
        text.push_str(&format!(
            "{chrom}\t{pos}\t.\t{reference}\t{alt}\t.\tPASS\t.\tGT:DP\t{}\n",
            gts.iter().map(|gt| format!("{gt}:10")).collect::<Vec<_>>().join("\t")
        ));
    }
    text
}

fn header_text() -> String {
    let mut text = String::from(
        "##fileformat=VCFv4.2\n\
         ##contig=<ID=1>\n\
         ##contig=<ID=X>\n\
         ##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">\n\
         ##FORMAT=<ID=DP,Number=1,Type=Integer,Description=\"Read depth\">\n\
         #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT",
    );
    for sample in SAMPLES {
        text.push('\t');
        text.push_str(sample);
    }
    text.push('\n');
    text
}

fn write_gzip(path: impl AsRef<Path>, bytes: &[u8]) -> io::Result<()> {
    let file = File::create(path)?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(bytes)?;
    encoder.finish()?;
    Ok(())
}

/// Re-encode VCF text as BGZF-compressed BCF.
fn write_bcf(path: impl AsRef<Path>, text: &str) -> io::Result<()> {
    let mut reader = vcf::io::Reader::new(text.as_bytes());
    let header = reader.read_header()?;

    let mut writer = bcf::io::Writer::new(File::create(path)?);
    writer.write_header(&header)?;
    for result in reader.record_bufs(&header) {
        let record = result?;
        writer.write_variant_record(&header, &record)?;
    }
    writer.try_finish()?;
    Ok(())
}
