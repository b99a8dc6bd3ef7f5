use crate::errors::Result;
use crate::genotype::{GT_KEY, Genotype};
use crate::variant::{InfoValue, MISSING, SampleFields, Variant};

/// INFO key recording the record a decomposed allele came from,
/// written as `contig:position:REF/ALT1/ALT2...`.
pub const OLD_MULTIALLELIC_KEY: &str = "OLD_MULTIALLELIC";

impl Variant {
    ///
    /// Split this record into one bi-allelic record per alternate.
    ///
    /// Each output carries the minimal anchored representation of its allele.
    /// GT calls are remapped so the kept allele becomes `1` and every other
    /// alternate collapses onto the reference; other sample fields are copied
    /// as they are.
    ///
    pub fn decompose(&self) -> Result<Vec<Variant>> {
        let origin = format!(
            "{}:{}:{}/{}",
            self.contig,
            self.position,
            self.reference,
            self.alternates.join("/")
        );

        let mut records = Vec::with_capacity(self.alternates.len());
        for (allele, alternate) in self.alleles().iter().zip(&self.alternates) {
            let (position, reference, alt) =
                allele.native_record(self.position, &self.reference, alternate);

            let mut info = self.info.clone();
            if self.is_multiallelic() {
                info.insert(
                    OLD_MULTIALLELIC_KEY.to_string(),
                    InfoValue::Text(origin.clone()),
                );
            }

            let samples = self
                .samples
                .iter()
                .map(|fields| remap_sample(fields, allele.index))
                .collect::<Result<Vec<SampleFields>>>()?;

            records.push(Variant {
                contig: self.contig.clone(),
                position,
                id: self.id.clone(),
                reference,
                alternates: vec![alt],
                quality: self.quality,
                filter: self.filter.clone(),
                info,
                format_keys: self.format_keys.clone(),
                samples,
                raw: self.raw.clone(),
                ..Default::default()
            });
        }
        Ok(records)
    }
}

fn remap_sample(fields: &SampleFields, keep: usize) -> Result<SampleFields> {
    let mut fields = fields.clone();
    if let Some(raw) = fields.get_mut(GT_KEY) {
        if raw.as_str() != MISSING && !raw.is_empty() {
            let mut genotype: Genotype = raw.parse()?;
            for copy in genotype.alleles.iter_mut().flatten() {
                *copy = usize::from(*copy == keep);
            }
            *raw = genotype.to_string();
        }
    }
    Ok(fields)
}
