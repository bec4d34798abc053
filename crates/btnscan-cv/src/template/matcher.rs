//! Template matching with masked normalized correlation coefficients

use super::{Template, TemplateConfig};
use crate::bbox::MatchCandidate;
use crate::traits::TemplateMatchable;
use crate::utils::nms::{CorrelationMap, Suppression};
use crate::Result;
use opencv::{
    core::Mat,
    imgproc,
    prelude::*,
};

/// Correlation method; scores range over [-1, 1] with 1 for an exact copy
pub const MATCH_METHOD: i32 = imgproc::TM_CCOEFF_NORMED;

/// OpenCV-based template matcher
pub struct TemplateMatcher {
    config: TemplateConfig,
}

impl TemplateMatcher {
    /// Create new template matcher
    pub fn new(config: TemplateConfig) -> Self {
        Self { config }
    }

    /// All non-overlapping matches of one template, best first
    pub fn match_single(&self, image: &Mat, template: &Template) -> Result<Vec<MatchCandidate>> {
        let map = self.correlate(image, template)?;
        let image_size = (image.cols(), image.rows());
        let template_size = (template.width(), template.height());

        let matches: Vec<MatchCandidate> = Suppression::new(
            map,
            template.height() as usize,
            template.width() as usize,
            self.config.threshold,
        )
        .map(|peak| {
            MatchCandidate::new(
                peak.row as i32,
                peak.col as i32,
                peak.score,
                template_size,
                image_size,
            )
        })
        .collect();

        log::debug!(
            "Template '{}': {} match(es) above {:.2}",
            template.name,
            matches.len(),
            self.config.threshold
        );
        Ok(matches)
    }

    /// Match multiple templates; the result keeps the order of `templates`
    pub fn match_multiple(&self, image: &Mat, templates: &[Template]) -> Result<Vec<Vec<MatchCandidate>>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            templates
                .par_iter()
                .map(|template| self.match_single(image, template))
                .collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            templates
                .iter()
                .map(|template| self.match_single(image, template))
                .collect()
        }
    }
}

impl TemplateMatchable for TemplateMatcher {
    /// Correlation surface of `template` over a grayscale `image`.
    ///
    /// Masked-out template pixels do not contribute. A template larger than
    /// the image has no placements and yields an empty map.
    fn correlate(&self, image: &Mat, template: &Template) -> Result<CorrelationMap> {
        if template.width() > image.cols() || template.height() > image.rows() {
            log::debug!(
                "Template '{}' ({}x{}) is larger than the image ({}x{})",
                template.name,
                template.width(),
                template.height(),
                image.cols(),
                image.rows()
            );
            return Ok(CorrelationMap::empty());
        }

        let mut result = Mat::default();
        imgproc::match_template(
            image,
            &template.grayscale,
            &mut result,
            MATCH_METHOD,
            &template.mask,
        )?;

        let rows = result.rows() as usize;
        let cols = result.cols() as usize;
        CorrelationMap::new(rows, cols, result.data_typed::<f32>()?.to_vec())
    }
}

impl Default for TemplateMatcher {
    fn default() -> Self {
        Self::new(TemplateConfig::default())
    }
}
